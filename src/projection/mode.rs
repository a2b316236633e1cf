use serde::{Deserialize, Serialize};

/// Transport category behind a GTFS route type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Tram,
    Metro,
    Rail,
    Bus,
    Trolleybus,
    Unknown,
}

impl From<Option<i32>> for TransportMode {
    fn from(route_type: Option<i32>) -> Self {
        match route_type {
            Some(0) => TransportMode::Tram,
            Some(1) => TransportMode::Metro,
            Some(2) => TransportMode::Rail,
            Some(3) => TransportMode::Bus,
            Some(11) => TransportMode::Trolleybus,
            _ => TransportMode::Unknown,
        }
    }
}

impl TransportMode {
    /// Scheduled city transit, the modes whose platforms are worth filtering.
    pub fn is_urban(&self) -> bool {
        matches!(
            self,
            TransportMode::Tram | TransportMode::Metro | TransportMode::Bus | TransportMode::Trolleybus
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransportMode::Tram => "tram",
            TransportMode::Metro => "metro",
            TransportMode::Rail => "train",
            TransportMode::Bus => "bus",
            TransportMode::Trolleybus => "trolleybus",
            TransportMode::Unknown => "",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            TransportMode::Tram => "🚋",
            TransportMode::Metro => "🚇",
            TransportMode::Rail => "🚆",
            TransportMode::Bus => "🚌",
            TransportMode::Trolleybus => "🚎",
            TransportMode::Unknown => "",
        }
    }

    /// Parses the names used by `name()`, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "tram" => Some(TransportMode::Tram),
            "metro" => Some(TransportMode::Metro),
            "train" | "rail" => Some(TransportMode::Rail),
            "bus" => Some(TransportMode::Bus),
            "trolleybus" | "trolley" => Some(TransportMode::Trolleybus),
            _ => None,
        }
    }

    /// The glyph and the name joined, either may be missing.
    pub fn label(&self, name: &str) -> String {
        let glyph = self.glyph();
        match (glyph.is_empty(), name.trim().is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => glyph.to_string(),
            (false, false) => format!("{glyph} {name}"),
        }
    }
}

#[test]
fn route_types_map_to_modes() {
    assert_eq!(TransportMode::from(Some(0)), TransportMode::Tram);
    assert_eq!(TransportMode::from(Some(1)), TransportMode::Metro);
    assert_eq!(TransportMode::from(Some(2)), TransportMode::Rail);
    assert_eq!(TransportMode::from(Some(3)), TransportMode::Bus);
    assert_eq!(TransportMode::from(Some(11)), TransportMode::Trolleybus);
    assert_eq!(TransportMode::from(Some(7)), TransportMode::Unknown);
    assert_eq!(TransportMode::from(None), TransportMode::Unknown);
}

#[test]
fn rail_is_not_urban() {
    assert!(!TransportMode::Rail.is_urban());
    assert!(!TransportMode::Unknown.is_urban());
    assert!(TransportMode::Trolleybus.is_urban());
}

#[test]
fn label_joins_glyph_and_name() {
    assert_eq!(TransportMode::Bus.label("bus"), "🚌 bus");
    assert_eq!(TransportMode::Bus.label(""), "🚌");
    assert_eq!(TransportMode::Unknown.label("Škoda 15T"), "Škoda 15T");
}
