use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, RouteField, Screen};
use crate::config::Config;
use crate::gemini::ChatReply;
use crate::lang::map_labels;
use crate::planner::PlannerMode;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            poll_tasks(app).await;
        }
    }
    Ok(())
}

/// Collect finished background work. Each controller has at most one task
/// in flight, so a single check per handle is enough.
async fn poll_tasks(app: &mut App) {
    if app.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
        if let Some(task) = app.chat_task.take() {
            // A panicked/aborted task degrades to the same apology the
            // client uses for transport failures
            let reply = task.await.unwrap_or_else(|_| ChatReply::apology());
            app.chat.complete(reply);
            app.scroll_chat_to_bottom();
        }
    }

    if app.planner_task.as_ref().is_some_and(|t| t.is_finished()) {
        if let Some(task) = app.planner_task.take() {
            let reply = task.await.unwrap_or_else(|_| ChatReply::apology());
            app.planner.complete(reply);
        }
    }

    if app.geo_task.as_ref().is_some_and(|t| t.is_finished()) {
        if let Some(task) = app.geo_task.take() {
            let reading = match task.await {
                Ok(Ok(coords)) => Some(coords),
                _ => None,
            };
            app.locating = false;
            let labels = map_labels(app.language);
            app.planner.apply_location(reading, labels.unknown);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_language_picker {
        handle_language_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_language_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_language_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.language_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.language_picker_nav_up(),
        KeyCode::Enter => {
            // Persist the choice here; App itself never touches the config
            if let Some(language) = app.select_language() {
                let _ = Config::save_language(language);
            }
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching works from any screen in normal mode
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::Home;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Explore;
            return;
        }
        KeyCode::Char('3') => {
            app.screen = Screen::Guide;
            return;
        }
        KeyCode::Char('4') => {
            app.screen = Screen::Map;
            return;
        }
        KeyCode::Char('5') => {
            app.screen = Screen::Events;
            return;
        }
        KeyCode::Char('L') => {
            app.open_language_picker();
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Home => handle_home_normal(app, key),
        Screen::Explore => handle_explore_normal(app, key),
        Screen::Guide => handle_guide_normal(app, key),
        Screen::Map => handle_map_normal(app, key),
        Screen::Events => handle_events_normal(app, key),
    }
}

fn handle_home_normal(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.screen = Screen::Guide;
        app.input_mode = InputMode::Editing;
    }
}

fn handle_explore_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.explore_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.explore_nav_up(),
        KeyCode::Char('f') => app.cycle_category_filter(),
        _ => {}
    }
}

fn handle_guide_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('a') => app.input_mode = InputMode::Editing,
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat_scroll = app.chat_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat_scroll = app.chat_scroll.saturating_sub(1);
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_map_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => {
            let next = match app.planner.mode {
                PlannerMode::Nearby => PlannerMode::Route,
                PlannerMode::Route => PlannerMode::Nearby,
            };
            app.planner.set_mode(next);
            app.result_scroll = 0;
        }
        KeyCode::Char('g') => start_locate(app),
        KeyCode::Char('J') => app.result_scroll = app.result_scroll.saturating_add(1),
        KeyCode::Char('K') => app.result_scroll = app.result_scroll.saturating_sub(1),
        _ => match app.planner.mode {
            PlannerMode::Nearby => match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.category_nav_down(),
                KeyCode::Char('k') | KeyCode::Up => app.category_nav_up(),
                KeyCode::Enter => submit_nearby(app),
                _ => {}
            },
            PlannerMode::Route => match key.code {
                KeyCode::Char('i') => app.input_mode = InputMode::Editing,
                KeyCode::Char('j') | KeyCode::Down => app.route_field = RouteField::Destination,
                KeyCode::Char('k') | KeyCode::Up => app.route_field = RouteField::Origin,
                KeyCode::Enter => submit_route(app),
                _ => {}
            },
        },
    }
}

fn handle_events_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.events_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.events_nav_up(),
        KeyCode::Char('m') => app.cycle_month_filter(),
        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Guide => handle_guide_editing(app, key),
        Screen::Map => handle_route_editing(app, key),
        Screen::Events => handle_search_editing(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_guide_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => submit_chat(app),
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_route_editing(app: &mut App, key: KeyEvent) {
    let field = match app.route_field {
        RouteField::Origin => &mut app.planner.origin,
        RouteField::Destination => &mut app.planner.destination,
    };
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => {
            app.route_field = match app.route_field {
                RouteField::Origin => RouteField::Destination,
                RouteField::Destination => RouteField::Origin,
            };
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            submit_route(app);
        }
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(c) => field.push(c),
        _ => {}
    }
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.event_search.pop();
            app.events_state.select(Some(0));
        }
        KeyCode::Char(c) => {
            app.event_search.push(c);
            app.events_state.select(Some(0));
        }
        _ => {}
    }
}

fn submit_chat(app: &mut App) {
    let input = app.chat_input.clone();
    if let Some((history, text)) = app.chat.begin_submit(&input) {
        app.chat_input.clear();
        app.chat_cursor = 0;
        app.scroll_chat_to_bottom();

        let gemini = app.gemini.clone();
        let language = app.language;
        app.chat_task = Some(tokio::spawn(async move {
            gemini.send(&history, &text, language).await
        }));
    }
}

fn submit_nearby(app: &mut App) {
    let labels = map_labels(app.language);
    let category = app.selected_category();
    if let Some(prompt) = app.planner.begin_nearby(category, labels.unknown) {
        app.result_scroll = 0;
        let gemini = app.gemini.clone();
        let language = app.language;
        // One-off query: no conversational memory
        app.planner_task = Some(tokio::spawn(
            async move { gemini.send(&[], &prompt, language).await },
        ));
    }
}

fn submit_route(app: &mut App) {
    let labels = map_labels(app.language);
    if let Some(prompt) = app.planner.begin_route(labels.unknown) {
        app.result_scroll = 0;
        let gemini = app.gemini.clone();
        let language = app.language;
        app.planner_task = Some(tokio::spawn(
            async move { gemini.send(&[], &prompt, language).await },
        ));
    }
}

fn start_locate(app: &mut App) {
    if app.locating {
        return;
    }
    app.locating = true;
    let geo = app.geo.clone();
    app.geo_task = Some(tokio::spawn(async move { geo.locate().await }));
}
