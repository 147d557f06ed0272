//! Itinerary rendering
//!
//! Turns ranked journeys into chat text: one block per option with per-leg
//! lines chosen by transport mode, and departure lines that show realtime
//! delays. Departure boards from the SL Transport API render here too. All
//! times are shown in a single configured timezone.

mod departures;
mod format;
mod time;

pub use departures::{format_departure, format_departures};

pub use format::{DEFAULT_JOURNEY_COUNT, ItineraryFormatter, NO_JOURNEYS, SEPARATOR, UNKNOWN_NAME, duration_minutes};
pub use time::{departure_line, local_time};
