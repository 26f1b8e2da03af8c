//! Static destination and event catalogs for the explore and events screens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationCategory {
    Culture,
    Nature,
    City,
    Food,
}

impl DestinationCategory {
    pub fn all() -> Vec<DestinationCategory> {
        vec![
            DestinationCategory::Culture,
            DestinationCategory::Nature,
            DestinationCategory::City,
            DestinationCategory::Food,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DestinationCategory::Culture => "Culture",
            DestinationCategory::Nature => "Nature",
            DestinationCategory::City => "City",
            DestinationCategory::Food => "Food",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Destination {
    pub name: &'static str,
    pub japanese_name: &'static str,
    pub description: &'static str,
    pub category: DestinationCategory,
    pub region: &'static str,
}

#[derive(Debug, Clone)]
pub struct JapanEvent {
    pub name: &'static str,
    pub japanese_name: &'static str,
    /// Text description of the date (e.g., "July 1-31")
    pub date: &'static str,
    /// 1-12, for filtering
    pub month: u32,
    pub location: &'static str,
    pub description: &'static str,
}

static DESTINATIONS: &[Destination] = &[
    Destination {
        name: "Kyoto",
        japanese_name: "京都",
        description: "The cultural heart of Japan, famous for its classical Buddhist temples, \
                      gardens, imperial palaces, Shinto shrines, and traditional wooden houses.",
        category: DestinationCategory::Culture,
        region: "Kansai",
    },
    Destination {
        name: "Akihabara",
        japanese_name: "秋葉原",
        description: "A buzzing shopping hub famed for its electronics retailers, ranging from \
                      tiny stalls to vast department stores, and the center of otaku culture.",
        category: DestinationCategory::City,
        region: "Tokyo",
    },
    Destination {
        name: "Mount Fuji",
        japanese_name: "富士山",
        description: "Japan's highest mountain and an active volcano. It is one of Japan's \
                      \"Three Holy Mountains\" and a UNESCO World Heritage site.",
        category: DestinationCategory::Nature,
        region: "Chubu",
    },
    Destination {
        name: "Dotonbori",
        japanese_name: "道頓堀",
        description: "A popular tourist destination in Osaka, running along the Dotonbori canal. \
                      Known for its eccentric signage and vast array of restaurants.",
        category: DestinationCategory::Food,
        region: "Osaka",
    },
    Destination {
        name: "Naoshima",
        japanese_name: "直島",
        description: "An island in the Seto Inland Sea that is known for its modern art museums, \
                      architecture, and sculptures.",
        category: DestinationCategory::Culture,
        region: "Kagawa",
    },
    Destination {
        name: "Hokkaido",
        japanese_name: "北海道",
        description: "The northernmost of Japan's main islands, known for its volcanoes, natural \
                      hot springs (onsen), and ski areas.",
        category: DestinationCategory::Nature,
        region: "Hokkaido",
    },
];

static EVENTS: &[JapanEvent] = &[
    JapanEvent {
        name: "Sapporo Snow Festival",
        japanese_name: "さっぽろ雪まつり",
        date: "Early February",
        month: 2,
        location: "Sapporo, Hokkaido",
        description: "One of Japan's most popular winter events, featuring hundreds of \
                      spectacular snow and ice sculptures.",
    },
    JapanEvent {
        name: "Cherry Blossom Season (Hanami)",
        japanese_name: "花見",
        date: "Late March - Early April",
        month: 4,
        location: "Nationwide",
        description: "The traditional custom of enjoying the transient beauty of flowers, \
                      flowers being almost always cherry blossoms.",
    },
    JapanEvent {
        name: "Kanda Matsuri",
        japanese_name: "神田祭",
        date: "Mid May (Odd numbered years)",
        month: 5,
        location: "Tokyo",
        description: "One of the three great festivals of Tokyo, featuring over 200 mikoshi \
                      (portable shrines) paraded through the streets.",
    },
    JapanEvent {
        name: "Gion Matsuri",
        japanese_name: "祇園祭",
        date: "July 1-31",
        month: 7,
        location: "Kyoto",
        description: "The festival of Yasaka Shrine, the most famous festival in Japan, \
                      culminating in a massive parade of floats.",
    },
    JapanEvent {
        name: "Tenjin Matsuri",
        japanese_name: "天神祭",
        date: "July 24-25",
        month: 7,
        location: "Osaka",
        description: "Ranked as one of Japan's top three festivals, featuring a land procession \
                      and a river procession with fireworks.",
    },
    JapanEvent {
        name: "Awa Odori",
        japanese_name: "阿波おどり",
        date: "August 12-15",
        month: 8,
        location: "Tokushima",
        description: "The largest dance festival in Japan, attracting over 1 million tourists \
                      every year.",
    },
    JapanEvent {
        name: "Takayama Autumn Festival",
        japanese_name: "高山祭",
        date: "October 9-10",
        month: 10,
        location: "Takayama",
        description: "Famous for its intricately carved floats that are lit with paper lanterns \
                      in the evening.",
    },
];

pub fn destinations() -> &'static [Destination] {
    DESTINATIONS
}

pub fn events() -> &'static [JapanEvent] {
    EVENTS
}

/// Destinations, optionally narrowed to one category
pub fn destinations_in(category: Option<DestinationCategory>) -> Vec<&'static Destination> {
    DESTINATIONS
        .iter()
        .filter(|d| category.map_or(true, |c| d.category == c))
        .collect()
}

/// Events, optionally narrowed to a month and a case-insensitive search
/// over name and location
pub fn events_filtered(month: Option<u32>, search: &str) -> Vec<&'static JapanEvent> {
    let needle = search.to_lowercase();
    EVENTS
        .iter()
        .filter(|e| month.map_or(true, |m| e.month == m))
        .filter(|e| {
            needle.is_empty()
                || e.name.to_lowercase().contains(&needle)
                || e.location.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_filter() {
        let culture = destinations_in(Some(DestinationCategory::Culture));
        assert_eq!(culture.len(), 2);
        assert!(culture.iter().all(|d| d.category == DestinationCategory::Culture));
        assert_eq!(destinations_in(None).len(), destinations().len());
    }

    #[test]
    fn test_month_filter() {
        let july = events_filtered(Some(7), "");
        assert_eq!(july.len(), 2);
        assert!(july.iter().all(|e| e.month == 7));
        assert!(events_filtered(Some(1), "").is_empty());
    }

    #[test]
    fn test_search_filter_matches_name_and_location() {
        let by_name = events_filtered(None, "gion");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Gion Matsuri");

        let by_location = events_filtered(None, "kyoto");
        assert!(by_location.iter().any(|e| e.name == "Gion Matsuri"));
    }

    #[test]
    fn test_months_are_valid() {
        assert!(events().iter().all(|e| (1..=12).contains(&e.month)));
    }
}
