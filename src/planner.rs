//! Location and route queries for the map screen.
//!
//! Unlike the guide chat these are one-off prompts with no conversational
//! memory: each query goes out with an empty history and overwrites the
//! single live result. One busy flag guards both query kinds.

use crate::gemini::ChatReply;

/// Sentinel the route origin field is auto-filled with after a location fix
pub const MY_LOCATION: &str = "My Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerMode {
    Nearby,
    Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceCategory {
    Food,
    Attractions,
    Shopping,
    Stations,
}

impl PlaceCategory {
    pub fn all() -> Vec<PlaceCategory> {
        vec![
            PlaceCategory::Food,
            PlaceCategory::Attractions,
            PlaceCategory::Shopping,
            PlaceCategory::Stations,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::Food => "Food",
            PlaceCategory::Attractions => "Attractions",
            PlaceCategory::Shopping => "Shopping",
            PlaceCategory::Stations => "Stations",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(PlaceCategory::Food),
            "attractions" => Some(PlaceCategory::Attractions),
            "shopping" => Some(PlaceCategory::Shopping),
            "stations" => Some(PlaceCategory::Stations),
            _ => None,
        }
    }
}

pub struct Planner {
    pub mode: PlannerMode,
    pub origin: String,
    pub destination: String,
    /// Formatted "lat, lon" pair, or the localized unknown label after a
    /// failed acquisition. None until a fix was attempted.
    pub location: Option<String>,
    pub result: Option<ChatReply>,
    loading: bool,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            mode: PlannerMode::Nearby,
            origin: String::new(),
            destination: String::new(),
            location: None,
            result: None,
            loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switching tabs discards the previous result
    pub fn set_mode(&mut self, mode: PlannerMode) {
        if self.mode != mode {
            self.mode = mode;
            self.result = None;
        }
    }

    /// The stored coordinates, if a fix succeeded
    fn fix(&self, unknown_label: &str) -> Option<&str> {
        self.location
            .as_deref()
            .filter(|loc| *loc != unknown_label)
    }

    /// Start a nearby-category query; returns the prompt to send, or None
    /// while another query is in flight
    pub fn begin_nearby(&mut self, category: PlaceCategory, unknown_label: &str) -> Option<String> {
        if self.loading {
            return None;
        }

        let prompt = match self.fix(unknown_label) {
            Some(coords) => format!(
                "I am at coordinates {}. List 3-4 best {} spots strictly near me. \
                 Include walking distance estimates.",
                coords,
                category.label()
            ),
            None => format!(
                "I am in Tokyo (default). List 3-4 best {} spots.",
                category.label()
            ),
        };

        self.loading = true;
        self.result = None;
        Some(prompt)
    }

    /// Start a route query; disabled while busy or while either endpoint
    /// field is empty. An origin equal to the "My Location" sentinel is
    /// replaced by the stored coordinates when a fix exists.
    pub fn begin_route(&mut self, unknown_label: &str) -> Option<String> {
        if self.loading || self.origin.is_empty() || self.destination.is_empty() {
            return None;
        }

        let origin = if self.origin == MY_LOCATION {
            self.fix(unknown_label).unwrap_or(&self.origin)
        } else {
            &self.origin
        };
        let prompt = format!(
            "Plan a detailed route from {} to {} using public transport in Japan. \
             Include train lines, costs, and time.",
            origin, self.destination
        );

        self.loading = true;
        self.result = None;
        Some(prompt)
    }

    /// Store the reply, overwriting any previous result
    pub fn complete(&mut self, reply: ChatReply) {
        self.result = Some(reply);
        self.loading = false;
    }

    /// Record the outcome of a geolocation attempt. Success stores the
    /// formatted pair and auto-fills the route origin; failure stores the
    /// localized unknown label and leaves the origin alone.
    pub fn apply_location(&mut self, reading: Option<(f64, f64)>, unknown_label: &str) {
        match reading {
            Some((latitude, longitude)) => {
                self.location = Some(format!("{:.4}, {:.4}", latitude, longitude));
                self.origin = MY_LOCATION.to_string();
            }
            None => {
                self.location = Some(unknown_label.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNKNOWN: &str = "Unknown Location";

    #[test]
    fn test_route_substitutes_coordinates_for_sentinel() {
        let mut planner = Planner::new();
        planner.apply_location(Some((35.68123, 139.76712)), UNKNOWN);
        assert_eq!(planner.origin, MY_LOCATION);
        planner.destination = "Kyoto Station".to_string();

        let prompt = planner.begin_route(UNKNOWN).unwrap();
        assert!(prompt.contains("35.6812, 139.7671"));
        assert!(!prompt.contains(MY_LOCATION));
        assert!(prompt.contains("Kyoto Station"));
    }

    #[test]
    fn test_route_keeps_literal_origin() {
        let mut planner = Planner::new();
        planner.origin = "Shinjuku".to_string();
        planner.destination = "Narita Airport".to_string();
        let prompt = planner.begin_route(UNKNOWN).unwrap();
        assert!(prompt.contains("from Shinjuku to Narita Airport"));
    }

    #[test]
    fn test_route_disabled_without_both_endpoints() {
        let mut planner = Planner::new();
        planner.origin = "Tokyo".to_string();
        assert!(planner.begin_route(UNKNOWN).is_none());
        assert!(!planner.is_loading());
    }

    #[test]
    fn test_nearby_with_fix_uses_coordinates() {
        let mut planner = Planner::new();
        planner.apply_location(Some((34.6937, 135.5023)), UNKNOWN);
        let prompt = planner
            .begin_nearby(PlaceCategory::Food, UNKNOWN)
            .unwrap();
        assert!(prompt.contains("34.6937, 135.5023"));
        assert!(prompt.contains("Food"));
        assert!(prompt.contains("walking distance"));
    }

    #[test]
    fn test_nearby_without_fix_defaults_to_tokyo() {
        let mut planner = Planner::new();
        let prompt = planner
            .begin_nearby(PlaceCategory::Shopping, UNKNOWN)
            .unwrap();
        assert!(prompt.contains("Tokyo (default)"));
        assert!(prompt.contains("Shopping"));
    }

    #[test]
    fn test_unknown_sentinel_is_not_a_fix() {
        let mut planner = Planner::new();
        planner.apply_location(None, UNKNOWN);
        let prompt = planner
            .begin_nearby(PlaceCategory::Attractions, UNKNOWN)
            .unwrap();
        assert!(prompt.contains("Tokyo (default)"));
    }

    #[test]
    fn test_failed_location_leaves_origin_untouched() {
        let mut planner = Planner::new();
        planner.apply_location(None, UNKNOWN);
        assert_eq!(planner.location.as_deref(), Some(UNKNOWN));
        assert!(planner.origin.is_empty());
    }

    #[test]
    fn test_single_flight_across_query_kinds() {
        let mut planner = Planner::new();
        planner.origin = "A".to_string();
        planner.destination = "B".to_string();
        assert!(planner.begin_nearby(PlaceCategory::Food, UNKNOWN).is_some());
        // Busy: both kinds are rejected until the reply lands
        assert!(planner.begin_nearby(PlaceCategory::Food, UNKNOWN).is_none());
        assert!(planner.begin_route(UNKNOWN).is_none());

        planner.complete(ChatReply {
            text: "result".to_string(),
            links: Vec::new(),
        });
        assert!(planner.begin_route(UNKNOWN).is_some());
    }

    #[test]
    fn test_result_overwritten_not_appended() {
        let mut planner = Planner::new();
        planner.begin_nearby(PlaceCategory::Food, UNKNOWN);
        planner.complete(ChatReply {
            text: "first".to_string(),
            links: Vec::new(),
        });
        planner.begin_nearby(PlaceCategory::Food, UNKNOWN);
        planner.complete(ChatReply {
            text: "second".to_string(),
            links: Vec::new(),
        });
        assert_eq!(planner.result.as_ref().unwrap().text, "second");
    }

    #[test]
    fn test_mode_switch_clears_result() {
        let mut planner = Planner::new();
        planner.begin_nearby(PlaceCategory::Food, UNKNOWN);
        planner.complete(ChatReply {
            text: "spots".to_string(),
            links: Vec::new(),
        });
        planner.set_mode(PlannerMode::Route);
        assert!(planner.result.is_none());
    }
}
