use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::catalog::DestinationCategory;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::gemini::{ChatReply, GeminiClient};
use crate::geo::GeoClient;
use crate::lang::Language;
use crate::planner::Planner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Explore,
    Guide,
    Map,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which route endpoint field the cursor is in on the map screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    Origin,
    Destination,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub language: Language,
    pub has_api_key: bool,

    // Guide chat state
    pub chat: ChatSession,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_task: Option<JoinHandle<ChatReply>>,

    // Map planner state
    pub planner: Planner,
    pub route_field: RouteField,
    pub category_state: ListState,
    pub planner_task: Option<JoinHandle<ChatReply>>,
    pub locating: bool,
    pub geo_task: Option<JoinHandle<anyhow::Result<(f64, f64)>>>,
    pub result_scroll: u16,

    // Explore state
    pub category_filter: Option<DestinationCategory>,
    pub explore_state: ListState,

    // Events state
    pub month_filter: Option<u32>,
    pub event_search: String,
    pub events_state: ListState,

    // Language picker state
    pub show_language_picker: bool,
    pub language_picker_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Clients, read-only after construction
    pub gemini: GeminiClient,
    pub geo: GeoClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let language = config.resolve_language();
        let api_key = config.resolve_api_key();
        let has_api_key = api_key.is_some();
        let gemini = GeminiClient::new(api_key.as_deref().unwrap_or(""), &config.resolve_model());

        let mut category_state = ListState::default();
        category_state.select(Some(0));
        let mut explore_state = ListState::default();
        explore_state.select(Some(0));
        let mut events_state = ListState::default();
        events_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            language,
            has_api_key,

            chat: ChatSession::new(language),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: None,

            planner: Planner::new(),
            route_field: RouteField::Origin,
            category_state,
            planner_task: None,
            locating: false,
            geo_task: None,
            result_scroll: 0,

            category_filter: None,
            explore_state,

            month_filter: None,
            event_search: String::new(),
            events_state,

            show_language_picker: false,
            language_picker_state: ListState::default(),

            animation_frame: 0,

            gemini,
            geo: GeoClient::new(),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_awaiting_response() || self.planner.is_loading() || self.locating {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll the chat so the latest message (or the typing indicator)
    /// is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.chat.conversation().messages() {
            total_lines += 1; // Role line
            for line in msg.text.lines() {
                total_lines += wrapped_line_count(line, wrap_width);
            }
            total_lines += msg.links.len() as u16;
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_awaiting_response() {
            total_lines += 2; // Role line + typing indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    // Explore navigation
    pub fn explore_nav_down(&mut self) {
        let len = crate::catalog::destinations_in(self.category_filter).len();
        if len > 0 {
            let i = self.explore_state.selected().unwrap_or(0);
            self.explore_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn explore_nav_up(&mut self) {
        let i = self.explore_state.selected().unwrap_or(0);
        self.explore_state.select(Some(i.saturating_sub(1)));
    }

    /// Cycle the category filter: all -> culture -> nature -> city -> food -> all
    pub fn cycle_category_filter(&mut self) {
        let all = DestinationCategory::all();
        self.category_filter = match self.category_filter {
            None => Some(all[0]),
            Some(current) => {
                let idx = all.iter().position(|c| *c == current).unwrap_or(0);
                all.get(idx + 1).copied()
            }
        };
        self.explore_state.select(Some(0));
    }

    // Events navigation
    pub fn events_nav_down(&mut self) {
        let len = crate::catalog::events_filtered(self.month_filter, &self.event_search).len();
        if len > 0 {
            let i = self.events_state.selected().unwrap_or(0);
            self.events_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn events_nav_up(&mut self) {
        let i = self.events_state.selected().unwrap_or(0);
        self.events_state.select(Some(i.saturating_sub(1)));
    }

    /// Cycle the month filter: all -> Jan -> ... -> Dec -> all
    pub fn cycle_month_filter(&mut self) {
        self.month_filter = match self.month_filter {
            None => Some(1),
            Some(12) => None,
            Some(m) => Some(m + 1),
        };
        self.events_state.select(Some(0));
    }

    // Nearby category navigation
    pub fn category_nav_down(&mut self) {
        let len = crate::planner::PlaceCategory::all().len();
        let i = self.category_state.selected().unwrap_or(0);
        self.category_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn category_nav_up(&mut self) {
        let i = self.category_state.selected().unwrap_or(0);
        self.category_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_category(&self) -> crate::planner::PlaceCategory {
        let all = crate::planner::PlaceCategory::all();
        all[self.category_state.selected().unwrap_or(0).min(all.len() - 1)]
    }

    // Language picker
    pub fn open_language_picker(&mut self) {
        let idx = Language::all()
            .iter()
            .position(|l| *l == self.language)
            .unwrap_or(0);
        self.language_picker_state.select(Some(idx));
        self.show_language_picker = true;
    }

    pub fn language_picker_nav_down(&mut self) {
        let len = Language::all().len();
        let i = self.language_picker_state.selected().unwrap_or(0);
        self.language_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn language_picker_nav_up(&mut self) {
        let i = self.language_picker_state.selected().unwrap_or(0);
        self.language_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Apply the highlighted language and return it so the caller can
    /// persist the choice. Stored messages are never rewritten; only future
    /// prompts and labels change. This type never touches the filesystem.
    pub fn select_language(&mut self) -> Option<Language> {
        let language = self
            .language_picker_state
            .selected()
            .and_then(|i| Language::all().get(i).copied())?;
        self.language = language;
        self.show_language_picker = false;
        Some(language)
    }
}

/// Lines a string occupies at `wrap_width`, counting chars so multibyte
/// text wraps the same as the renderer
fn wrapped_line_count(line: &str, wrap_width: usize) -> u16 {
    let chars = line.chars().count();
    if chars == 0 {
        1
    } else {
        chars.div_ceil(wrap_width) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(&Config::new())
    }

    #[test]
    fn test_month_filter_cycles_through_year() {
        let mut app = test_app();
        assert_eq!(app.month_filter, None);
        app.cycle_month_filter();
        assert_eq!(app.month_filter, Some(1));
        for _ in 0..11 {
            app.cycle_month_filter();
        }
        assert_eq!(app.month_filter, Some(12));
        app.cycle_month_filter();
        assert_eq!(app.month_filter, None);
    }

    #[test]
    fn test_category_filter_cycles_back_to_all() {
        let mut app = test_app();
        assert_eq!(app.category_filter, None);
        for _ in 0..DestinationCategory::all().len() {
            app.cycle_category_filter();
            assert!(app.category_filter.is_some());
        }
        app.cycle_category_filter();
        assert_eq!(app.category_filter, None);
    }

    #[test]
    fn test_select_language_updates_state() {
        let mut app = test_app();
        app.open_language_picker();
        app.language_picker_nav_down();
        app.language_picker_state.select(Some(2));

        // The choice comes back to the caller; writing it to the config
        // file is the event handler's job, not App's
        let chosen = app.select_language();
        assert_eq!(chosen, Some(Language::Fr));
        assert_eq!(app.language, Language::Fr);
        assert!(!app.show_language_picker);
    }

    #[test]
    fn test_select_language_without_selection_is_noop() {
        let mut app = test_app();
        assert_eq!(app.select_language(), None);
        assert_eq!(app.language, Language::En);
    }

    #[test]
    fn test_wrapped_line_count_exact_multiple_of_width() {
        assert_eq!(wrapped_line_count(&"a".repeat(49), 50), 1);
        assert_eq!(wrapped_line_count(&"a".repeat(50), 50), 1);
        assert_eq!(wrapped_line_count(&"a".repeat(51), 50), 2);
        assert_eq!(wrapped_line_count(&"a".repeat(100), 50), 2);
        assert_eq!(wrapped_line_count("", 50), 1);
    }
}
