use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;

mod app;
mod catalog;
mod chat;
mod config;
mod gemini;
mod geo;
mod handler;
mod lang;
mod planner;
mod state;
mod tui;
mod ui;

use app::App;
use config::Config;
use gemini::{ChatReply, GeminiClient};
use geo::GeoClient;
use lang::{map_labels, Language};
use planner::{PlaceCategory, Planner};

#[derive(Parser)]
#[command(name = "nihongo")]
#[command(about = "Japan travel guide with an AI assistant grounded in Google Maps")]
struct Cli {
    /// Display language (en, es, fr, zh, ko); overrides the saved config
    #[arg(short, long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the travel guide a one-off question
    Ask {
        /// Your question
        question: String,
    },
    /// Find spots of a category near you (food, attractions, shopping, stations)
    Nearby {
        /// Place category
        category: String,
        /// Look up your position first (IP-based)
        #[arg(short = 'g', long)]
        locate: bool,
    },
    /// Plan a public-transport route between two places
    Route {
        /// Starting point
        from: String,
        /// Destination
        to: String,
    },
    /// List the destination catalog
    Destinations,
    /// List events and festivals, optionally for one month (1-12)
    Events {
        #[arg(short, long)]
        month: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let language = cli
        .lang
        .as_deref()
        .and_then(Language::from_str)
        .unwrap_or_else(|| config.resolve_language());

    match cli.command {
        None => run_tui(&config).await,
        Some(Commands::Ask { question }) => ask(&config, language, &question).await,
        Some(Commands::Nearby { category, locate }) => {
            nearby(&config, language, &category, locate).await
        }
        Some(Commands::Route { from, to }) => route(&config, language, &from, &to).await,
        Some(Commands::Destinations) => list_destinations(),
        Some(Commands::Events { month }) => list_events(month),
    }
}

async fn run_tui(config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(config);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

fn guide_client(config: &Config) -> Result<GeminiClient> {
    let api_key = config
        .resolve_api_key()
        .ok_or_else(|| anyhow!("No API key: set GEMINI_API_KEY or add api_key to the config"))?;
    Ok(GeminiClient::new(&api_key, &config.resolve_model()))
}

fn print_reply(reply: &ChatReply) {
    println!("{}", reply.text);
    if !reply.links.is_empty() {
        println!();
        for link in &reply.links {
            let marker = match link.source {
                state::LinkSource::Maps => "[maps]".green(),
                state::LinkSource::Web => "[web]".blue(),
            };
            println!("{} {} {}", marker, link.title.bold(), link.uri.dimmed());
        }
    }
}

async fn ask(config: &Config, language: Language, question: &str) -> Result<()> {
    let client = guide_client(config)?;
    println!("{}\n", "Consulting the guide...".dimmed());
    let reply = client.send(&[], question, language).await;
    print_reply(&reply);
    Ok(())
}

async fn nearby(config: &Config, language: Language, category: &str, locate: bool) -> Result<()> {
    let category = PlaceCategory::from_str(category).ok_or_else(|| {
        anyhow!("Unknown category '{category}'. Use food, attractions, shopping, or stations")
    })?;
    let client = guide_client(config)?;
    let labels = map_labels(language);

    let mut planner = Planner::new();
    if locate {
        let reading = GeoClient::new().locate().await.ok();
        planner.apply_location(reading, labels.unknown);
        match &planner.location {
            Some(loc) if loc != labels.unknown => {
                println!("{} {}", "Located at".dimmed(), loc.cyan())
            }
            _ => println!("{}", labels.unknown.yellow()),
        }
    }

    if let Some(prompt) = planner.begin_nearby(category, labels.unknown) {
        println!("{}\n", "Consulting the guide...".dimmed());
        let reply = client.send(&[], &prompt, language).await;
        print_reply(&reply);
    }
    Ok(())
}

async fn route(config: &Config, language: Language, from: &str, to: &str) -> Result<()> {
    let client = guide_client(config)?;
    let labels = map_labels(language);

    let mut planner = Planner::new();
    planner.origin = from.to_string();
    planner.destination = to.to_string();

    match planner.begin_route(labels.unknown) {
        Some(prompt) => {
            println!("{}\n", "Consulting the guide...".dimmed());
            let reply = client.send(&[], &prompt, language).await;
            print_reply(&reply);
            Ok(())
        }
        None => Err(anyhow!("Both origin and destination are required")),
    }
}

fn list_destinations() -> Result<()> {
    println!("\n{}", "Destinations".bold().red());
    for d in catalog::destinations() {
        println!(
            "\n{} {}  {}",
            d.name.bold(),
            d.japanese_name.red(),
            format!("[{} · {}]", d.category.label(), d.region).dimmed()
        );
        println!("  {}", d.description);
    }
    Ok(())
}

fn list_events(month: Option<u32>) -> Result<()> {
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(anyhow!("Month must be between 1 and 12"));
        }
    }

    let events = catalog::events_filtered(month, "");
    if events.is_empty() {
        println!("{}", "No events found for this filter.".yellow());
        return Ok(());
    }

    println!("\n{}", "Events & Festivals".bold().red());
    for e in events {
        println!(
            "\n{} {}  {}",
            e.name.bold(),
            e.japanese_name.red(),
            format!("[{} · {}]", e.date, e.location).dimmed()
        );
        println!("  {}", e.description);
    }
    Ok(())
}
