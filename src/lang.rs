//! Display languages and the localized UI labels that depend on them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Es,
    Fr,
    Zh,
    Ko,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Zh => "zh",
            Language::Ko => "ko",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            "fr" => Some(Language::Fr),
            "zh" => Some(Language::Zh),
            "ko" => Some(Language::Ko),
            _ => None,
        }
    }

    pub fn all() -> Vec<Language> {
        vec![
            Language::En,
            Language::Es,
            Language::Fr,
            Language::Zh,
            Language::Ko,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::Zh => "中文",
            Language::Ko => "한국어",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Language::En => "🇺🇸",
            Language::Es => "🇪🇸",
            Language::Fr => "🇫🇷",
            Language::Zh => "🇨🇳",
            Language::Ko => "🇰🇷",
        }
    }

    /// The language name the model is asked to respond in
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::Zh => "Chinese",
            Language::Ko => "Korean",
        }
    }
}

/// Localized labels for the map/planner screen
pub struct MapLabels {
    pub title: &'static str,
    pub nearby: &'static str,
    pub route: &'static str,
    pub locate: &'static str,
    pub locating: &'static str,
    pub unknown: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub plan: &'static str,
}

pub fn map_labels(language: Language) -> MapLabels {
    match language {
        Language::En => MapLabels {
            title: "Smart Map & Route",
            nearby: "Explore Nearby",
            route: "Route Planner",
            locate: "Get My Location",
            locating: "Locating...",
            unknown: "Unknown Location",
            from: "From",
            to: "To",
            plan: "Plan Route",
        },
        Language::Es => MapLabels {
            title: "Mapa Inteligente",
            nearby: "Explorar Cerca",
            route: "Ruta",
            locate: "Mi Ubicación",
            locating: "Ubicando...",
            unknown: "Ubicación Desconocida",
            from: "Desde",
            to: "Hasta",
            plan: "Planear Ruta",
        },
        Language::Fr => MapLabels {
            title: "Carte Intelligente",
            nearby: "Explorer à Proximité",
            route: "Itinéraire",
            locate: "Ma Position",
            locating: "Localisation...",
            unknown: "Lieu Inconnu",
            from: "De",
            to: "À",
            plan: "Calculer l'itinéraire",
        },
        Language::Zh => MapLabels {
            title: "智能地图",
            nearby: "附近探索",
            route: "路线规划",
            locate: "获取位置",
            locating: "定位中...",
            unknown: "未知位置",
            from: "起点",
            to: "终点",
            plan: "规划路线",
        },
        Language::Ko => MapLabels {
            title: "스마트 지도",
            nearby: "주변 탐색",
            route: "경로 플래너",
            locate: "내 위치",
            locating: "위치 확인 중...",
            unknown: "알 수 없는 위치",
            from: "출발",
            to: "도착",
            plan: "경로 계획",
        },
    }
}

/// Localized labels for the events screen
pub struct EventLabels {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub filter_all: &'static str,
}

pub fn event_labels(language: Language) -> EventLabels {
    match language {
        Language::En => EventLabels {
            title: "Local Events & Festivals",
            subtitle: "Discover the vibrant celebrations across Japan.",
            filter_all: "All Months",
        },
        Language::Es => EventLabels {
            title: "Eventos y Festivales",
            subtitle: "Descubre las vibrantes celebraciones en todo Japón.",
            filter_all: "Todos los Meses",
        },
        Language::Fr => EventLabels {
            title: "Événements Locaux",
            subtitle: "Découvrez les célébrations vibrantes à travers le Japon.",
            filter_all: "Tous les Mois",
        },
        Language::Zh => EventLabels {
            title: "当地活动与节日",
            subtitle: "探索日本各地充满活力的庆典。",
            filter_all: "所有月份",
        },
        Language::Ko => EventLabels {
            title: "지역 이벤트 및 축제",
            subtitle: "일본 전역의 활기찬 축제를 발견하세요.",
            filter_all: "모든 달",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for lang in Language::all() {
            assert_eq!(Language::from_str(lang.as_str()), Some(lang));
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(Language::from_str("de"), None);
        assert_eq!(Language::from_str(""), None);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(Language::from_str("EN"), Some(Language::En));
    }
}
