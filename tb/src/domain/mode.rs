//! Transport mode classification for trip legs

use std::fmt;

/// Vehicle type of a leg, resolved once from the backend's product name
///
/// An absent product name or `footpath` is walking. Names the bot has no
/// dedicated presentation for are kept verbatim (lower-cased) in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Walk,
    Bus,
    Metro,
    Tram,
    Other(String),
}

impl TransportMode {
    /// Classify a product name (case-insensitive, surrounding whitespace ignored)
    pub fn from_product_name(name: Option<&str>) -> Self {
        let name = name.map(|n| n.trim().to_lowercase()).unwrap_or_default();
        match name.as_str() {
            "" | "footpath" => TransportMode::Walk,
            "bus" => TransportMode::Bus,
            "metro" => TransportMode::Metro,
            "tram" => TransportMode::Tram,
            _ => TransportMode::Other(name),
        }
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, TransportMode::Walk)
    }

    /// Display icon
    pub fn icon(&self) -> &'static str {
        match self {
            TransportMode::Walk => "🚶",
            TransportMode::Bus => "🚌",
            TransportMode::Metro => "🚇",
            TransportMode::Tram => "🚊",
            TransportMode::Other(_) => "🚆",
        }
    }

    /// Title-cased mode name ("Walk", "Bus", "Commuter Train", ...)
    pub fn title(&self) -> String {
        match self {
            TransportMode::Walk => "Walk".to_string(),
            TransportMode::Bus => "Bus".to_string(),
            TransportMode::Metro => "Metro".to_string(),
            TransportMode::Tram => "Tram".to_string(),
            TransportMode::Other(name) => title_case(name),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

/// Upper-case the first letter of every whitespace-separated word
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_classification() {
        assert_eq!(TransportMode::from_product_name(None), TransportMode::Walk);
        assert_eq!(TransportMode::from_product_name(Some("")), TransportMode::Walk);
        assert_eq!(TransportMode::from_product_name(Some(" Footpath ")), TransportMode::Walk);
    }

    #[test]
    fn test_known_modes_case_insensitive() {
        assert_eq!(TransportMode::from_product_name(Some("BUS")), TransportMode::Bus);
        assert_eq!(TransportMode::from_product_name(Some("Metro")), TransportMode::Metro);
        assert_eq!(TransportMode::from_product_name(Some("tram")), TransportMode::Tram);
    }

    #[test]
    fn test_unknown_mode_is_explicit() {
        let mode = TransportMode::from_product_name(Some("Commuter train"));
        assert_eq!(mode, TransportMode::Other("commuter train".to_string()));
        assert_eq!(mode.title(), "Commuter Train");
        assert_eq!(mode.icon(), "🚆");
    }
}
