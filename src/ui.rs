use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, RouteField, Screen};
use crate::catalog;
use crate::lang::{event_labels, map_labels, Language};
use crate::planner::{PlaceCategory, PlannerMode};
use crate::state::{LinkSource, Message, Role};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        if let Some(len) = rest[start + 2..].find("**") {
            if start > 0 {
                spans.push(Span::raw(rest[..start].to_string()));
            }
            spans.push(Span::styled(
                rest[start + 2..start + 2 + len].to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            rest = &rest[start + 2 + len + 2..];
        } else {
            // No closing **, treat the rest as literal
            break;
        }
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home_screen(app, frame, body_area),
        Screen::Explore => render_explore_screen(app, frame, body_area),
        Screen::Guide => render_guide_screen(app, frame, body_area),
        Screen::Map => render_map_screen(app, frame, body_area),
        Screen::Events => render_events_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_language_picker {
        render_language_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_warning = if app.has_api_key {
        String::new()
    } else {
        " [GEMINI_API_KEY not set]".to_string()
    };

    let title = Line::from(vec![
        Span::styled(" NihonGo ", Style::default().fg(Color::Red).bold()),
        Span::styled("日本語ガイド", Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::raw(app.language.flag()),
        Span::raw(" "),
        Span::styled(
            app.language.display_name(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(key_warning, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match (app.screen, app.input_mode) {
        (Screen::Home, _) => "Enter ask the guide | 1-5 screens | L language | q quit",
        (Screen::Explore, _) => "j/k select | f filter category | 1-5 screens | q quit",
        (Screen::Guide, InputMode::Normal) => "i type | j/k scroll | G bottom | 1-5 screens | q quit",
        (Screen::Guide, InputMode::Editing) => "Enter send | Esc done",
        (Screen::Map, InputMode::Normal) => {
            "Tab nearby/route | g locate | j/k select | Enter query | J/K scroll result | q quit"
        }
        (Screen::Map, InputMode::Editing) => "Tab switch field | Enter plan | Esc done",
        (Screen::Events, InputMode::Normal) => "j/k select | m month filter | / search | q quit",
        (Screen::Events, InputMode::Editing) => "type to search | Enter/Esc done",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", hints),
            Style::default().fg(Color::DarkGray),
        ))),
        area,
    );
}

fn thinking_indicator(frame_idx: u8) -> String {
    let dots = match frame_idx {
        0 => ".",
        1 => "..",
        _ => "...",
    };
    format!("Thinking{}", dots)
}

fn render_home_screen(_app: &mut App, frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Discover Japan with AI",
            Style::default().fg(Color::Red),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Experience Japan Like a Local",
            Style::default().bold(),
        )),
        Line::default(),
        Line::from("Your personal intelligent guide to the Land of the Rising Sun."),
        Line::default(),
        Line::default(),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("Enter", Style::default().fg(Color::Red).bold()),
            Span::raw(" to ask the guide, or pick a screen:"),
        ]),
        Line::default(),
        Line::from("  2 Explore destinations"),
        Line::from("  3 AI travel guide"),
        Line::from("  4 Smart map & route"),
        Line::from("  5 Events & festivals"),
    ];

    let block = Block::default().borders(Borders::ALL).title(" Home ");
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn render_explore_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let destinations = catalog::destinations_in(app.category_filter);
    let filter_label = app
        .category_filter
        .map(|c| c.label())
        .unwrap_or("All");

    let items: Vec<ListItem> = destinations
        .iter()
        .map(|d| {
            ListItem::new(Line::from(vec![
                Span::raw(d.name),
                Span::styled(
                    format!("  {}", d.region),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Destinations [{}] ", filter_label)),
        )
        .highlight_style(Style::default().bg(Color::Red).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.explore_state);

    let detail: Vec<Line> = match app
        .explore_state
        .selected()
        .and_then(|i| destinations.get(i))
    {
        Some(d) => vec![
            Line::from(vec![
                Span::styled(d.name, Style::default().bold()),
                Span::raw(" "),
                Span::styled(d.japanese_name, Style::default().fg(Color::Red)),
            ]),
            Line::from(Span::styled(
                format!("{} · {}", d.category.label(), d.region),
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from(d.description),
        ],
        None => vec![Line::from("Select a destination")],
    };

    frame.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Details ")),
        detail_area,
    );
}

/// Build the display lines for one chat message, including its links
fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (label, color) = match msg.role {
        Role::User => ("You", Color::Blue),
        Role::Model => ("Guide", Color::Red),
    };
    let time = chrono::DateTime::from_timestamp_millis(msg.timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(format!("{}:", label), Style::default().fg(color).bold()),
        Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
    ]));

    for text_line in msg.text.lines() {
        lines.push(parse_markdown_line(text_line));
    }

    for link in &msg.links {
        let marker = match link.source {
            LinkSource::Maps => "[maps]",
            LinkSource::Web => "[web]",
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::raw(" "),
            Span::styled(link.title.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(" {}", link.uri),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    lines.push(Line::default());
    lines
}

fn render_guide_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Record the drawable size for scroll-to-bottom calculations
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.chat.conversation().messages() {
        lines.extend(message_lines(msg));
    }
    if app.chat.is_awaiting_response() {
        lines.push(Line::from(Span::styled(
            "Guide:",
            Style::default().fg(Color::Red).bold(),
        )));
        lines.push(Line::from(Span::styled(
            thinking_indicator(app.animation_frame),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" AI Travel Assistant "),
        );
    frame.render_widget(chat, chat_area);

    let input_style = if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(app.chat_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Ask about trains, food, or places... "),
    );
    frame.render_widget(input, input_area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = input_area.x + 1 + app.chat_cursor.min(u16::MAX as usize) as u16;
        frame.set_cursor_position((cursor_x.min(input_area.right().saturating_sub(2)), input_area.y + 1));
    }
}

fn render_map_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels = map_labels(app.language);

    let [tabs_area, control_area, result_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Min(0),
    ])
    .areas(area);

    let tab_style = |active: bool| {
        if active {
            Style::default().fg(Color::White).bg(Color::Red).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let location_text = match (&app.locating, &app.planner.location) {
        (true, _) => labels.locating.to_string(),
        (false, Some(loc)) => loc.clone(),
        (false, None) => format!("g: {}", labels.locate),
    };
    let tabs = Line::from(vec![
        Span::styled(format!(" {} ", labels.title), Style::default().fg(Color::Red).bold()),
        Span::raw(" "),
        Span::styled(format!(" {} ", labels.nearby), tab_style(app.planner.mode == PlannerMode::Nearby)),
        Span::raw(" "),
        Span::styled(format!(" {} ", labels.route), tab_style(app.planner.mode == PlannerMode::Route)),
        Span::raw("   "),
        Span::styled(location_text, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(tabs), tabs_area);

    match app.planner.mode {
        PlannerMode::Nearby => render_nearby_controls(app, frame, control_area),
        PlannerMode::Route => {
            render_route_controls(app, frame, control_area, labels.from, labels.to, labels.plan)
        }
    }

    render_query_result(app, frame, result_area);
}

fn render_nearby_controls(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = PlaceCategory::all()
        .iter()
        .map(|c| ListItem::new(c.label()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Find places near you "),
        )
        .highlight_style(Style::default().bg(Color::Red).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.category_state);
}

fn render_route_controls(
    app: &mut App,
    frame: &mut Frame,
    area: Rect,
    from: &str,
    to: &str,
    plan: &str,
) {
    let [origin_area, dest_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(3)]).areas(area);

    let field_style = |field: RouteField| {
        if app.route_field == field && app.input_mode == InputMode::Editing {
            Style::default().fg(Color::Yellow)
        } else if app.route_field == field {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    frame.render_widget(
        Paragraph::new(app.planner.origin.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_style(RouteField::Origin))
                .title(format!(" {} ", from)),
        ),
        origin_area,
    );
    frame.render_widget(
        Paragraph::new(app.planner.destination.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_style(RouteField::Destination))
                .title(format!(" {} (Enter: {}) ", to, plan)),
        ),
        dest_area,
    );
}

fn render_query_result(app: &mut App, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if app.planner.is_loading() {
        lines.push(Line::from(Span::styled(
            format!("Consulting the guide{}", ".".repeat(app.animation_frame as usize + 1)),
            Style::default().fg(Color::DarkGray),
        )));
    } else if let Some(result) = &app.planner.result {
        for text_line in result.text.lines() {
            lines.push(parse_markdown_line(text_line));
        }
        if !result.links.is_empty() {
            lines.push(Line::default());
            for link in &result.links {
                let marker = match link.source {
                    LinkSource::Maps => "[maps]",
                    LinkSource::Web => "[web]",
                };
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::raw(" "),
                    Span::styled(link.title.clone(), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!(" {}", link.uri),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
    } else {
        let hint = match app.planner.mode {
            PlannerMode::Nearby => "Select a category to find places near you.",
            PlannerMode::Route => "Enter locations to get detailed transit directions.",
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(" Result ")),
        area,
    );
}

fn render_events_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels = event_labels(app.language);

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let events = catalog::events_filtered(app.month_filter, &app.event_search);
    let month_label = app
        .month_filter
        .map(|m| m.to_string())
        .unwrap_or_else(|| labels.filter_all.to_string());
    let search_label = if app.event_search.is_empty() {
        String::new()
    } else {
        format!(" /{}", app.event_search)
    };

    let items: Vec<ListItem> = events
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::raw(e.name),
                Span::styled(
                    format!("  {}", e.date),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} [{}]{} ",
            labels.title, month_label, search_label
        )))
        .highlight_style(Style::default().bg(Color::Red).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.events_state);

    let detail: Vec<Line> = match app.events_state.selected().and_then(|i| events.get(i)) {
        Some(e) => vec![
            Line::from(vec![
                Span::styled(e.name, Style::default().bold()),
                Span::raw(" "),
                Span::styled(e.japanese_name, Style::default().fg(Color::Red)),
            ]),
            Line::from(Span::styled(
                format!("{} · {}", e.date, e.location),
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from(e.description),
        ],
        None => vec![Line::from(labels.subtitle)],
    };

    frame.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Details ")),
        detail_area,
    );
}

fn render_language_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(30, 9, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = Language::all()
        .iter()
        .map(|l| ListItem::new(format!("{} {}", l.flag(), l.display_name())))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Language ")
                .border_style(Style::default().fg(Color::Red)),
        )
        .highlight_style(Style::default().bg(Color::Red).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, popup, &mut app.language_picker_state);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("Try **Ichiran** near Shibuya");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "Ichiran");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_bold_is_literal() {
        let line = parse_markdown_line("a **b");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a **b");
    }

    #[test]
    fn test_parse_markdown_plain() {
        let line = parse_markdown_line("plain text");
        assert_eq!(line.spans.len(), 1);
    }
}
