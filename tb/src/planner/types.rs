//! Journey-planner wire and domain types

use serde::Deserialize;
use std::fmt;

use crate::domain::TransportMode;

/// Informational or error message attached to backend responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemMessage {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub text: String,
}

/// Body of a `/stop-finder` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopFinderResponse {
    #[serde(default)]
    pub system_messages: Vec<SystemMessage>,
    #[serde(default)]
    pub locations: Vec<Candidate>,
}

/// Body of a `/trips` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripsResponse {
    #[serde(default)]
    pub system_messages: Vec<SystemMessage>,
    #[serde(default)]
    pub journeys: Vec<Journey>,
}

/// Category of a search result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Stop,
    Address,
    Poi,
    Station,
    Other(String),
}

impl From<String> for LocationKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "stop" | "stop_area" => LocationKind::Stop,
            "address" | "street" => LocationKind::Address,
            "poi" => LocationKind::Poi,
            "station" => LocationKind::Station,
            _ => LocationKind::Other(s),
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKind::Stop => f.write_str("stop"),
            LocationKind::Address => f.write_str("address"),
            LocationKind::Poi => f.write_str("poi"),
            LocationKind::Station => f.write_str("station"),
            LocationKind::Other(s) => f.write_str(s),
        }
    }
}

/// Geographic point (WGS84)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A location returned by search, not yet confirmed by the user
///
/// The `id` is opaque and stable across requests; it is what gets persisted.
/// Read from stop-finder results (`id`, `type`, `[lat, lon]`) and from SL
/// site lists (`siteId`, `type`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CandidateWire")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub kind: LocationKind,
    pub coord: Option<Coordinate>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LocationKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            coord: None,
        }
    }

    pub fn with_coord(mut self, lat: f64, lon: f64) -> Self {
        self.coord = Some(Coordinate { lat, lon });
        self
    }

    /// Button label: `"<name> (<type>)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

// Stop-finder ids are strings; site lists use integers
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CandidateWire {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "siteId")]
    site_id: Option<WireId>,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    coord: Option<Vec<f64>>,
}

impl From<CandidateWire> for Candidate {
    fn from(w: CandidateWire) -> Self {
        let coord = match w.coord.as_deref() {
            Some([lat, lon, ..]) => Some(Coordinate { lat: *lat, lon: *lon }),
            _ => None,
        };
        // Untyped site-list entries are stop areas
        let kind = match (w.kind, &w.site_id) {
            (Some(kind), _) => LocationKind::from(kind),
            (None, Some(_)) => LocationKind::Stop,
            (None, None) => LocationKind::from(String::new()),
        };
        let id = w
            .id
            .map(String::from)
            .filter(|id| !id.is_empty())
            .or_else(|| w.site_id.map(String::from))
            .unwrap_or_default();
        Self {
            id,
            name: w.name,
            kind,
            coord,
        }
    }
}

/// One end of a leg; times are raw ISO-8601 strings as delivered
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegPoint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub departure_time_planned: Option<String>,
    pub departure_time_estimated: Option<String>,
    pub arrival_time_planned: Option<String>,
    pub arrival_time_estimated: Option<String>,
}

impl LegPoint {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn departing(mut self, planned: Option<&str>, estimated: Option<&str>) -> Self {
        self.departure_time_planned = planned.map(String::from);
        self.departure_time_estimated = estimated.map(String::from);
        self
    }

    pub fn arriving(mut self, planned: Option<&str>, estimated: Option<&str>) -> Self {
        self.arrival_time_planned = planned.map(String::from);
        self.arrival_time_estimated = estimated.map(String::from);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub class: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ref {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The vehicle serving a leg
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub product: Product,
    /// Terminus of the line, not the leg's own destination
    pub destination: Option<Ref>,
}

impl Transportation {
    pub fn new(product: &str, number: &str) -> Self {
        Self {
            number: number.to_string(),
            product: Product {
                name: product.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn towards(mut self, destination: &str) -> Self {
        self.destination = Some(Ref {
            name: destination.to_string(),
            ..Default::default()
        });
        self
    }

    /// Human label of the line's terminus, if known
    pub fn direction(&self) -> Option<&str> {
        self.destination.as_ref().map(|d| d.name.as_str()).filter(|n| !n.is_empty())
    }
}

/// One segment of a journey
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "LegWire")]
pub struct Leg {
    /// Seconds
    pub duration: u64,
    pub origin: LegPoint,
    pub destination: LegPoint,
    pub transportation: Option<Transportation>,
    pub mode: TransportMode,
}

impl Leg {
    pub fn new(duration: u64, origin: LegPoint, destination: LegPoint, transportation: Option<Transportation>) -> Self {
        let mode = TransportMode::from_product_name(transportation.as_ref().map(|t| t.product.name.as_str()));
        Self {
            duration,
            origin,
            destination,
            transportation,
            mode,
        }
    }

    pub fn walk(duration: u64, origin: LegPoint, destination: LegPoint) -> Self {
        Self::new(duration, origin, destination, None)
    }
}

#[derive(Deserialize)]
struct LegWire {
    #[serde(default)]
    duration: u64,
    #[serde(default)]
    origin: LegPoint,
    #[serde(default)]
    destination: LegPoint,
    transportation: Option<Transportation>,
}

impl From<LegWire> for Leg {
    fn from(w: LegWire) -> Self {
        Leg::new(w.duration, w.origin, w.destination, w.transportation)
    }
}

/// An itinerary option: ordered legs plus aggregate figures
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[serde(default)]
    pub trip_id: String,
    /// Scheduled duration in seconds
    #[serde(default)]
    pub trip_duration: u64,
    /// Realtime duration in seconds, 0 when unknown
    #[serde(default)]
    pub trip_rt_duration: u64,
    #[serde(default)]
    pub interchanges: u32,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

impl Journey {
    /// Realtime duration when the backend supplied one, else the scheduled one
    pub fn effective_duration(&self) -> u64 {
        if self.trip_rt_duration > 0 {
            self.trip_rt_duration
        } else {
            self.trip_duration
        }
    }
}
