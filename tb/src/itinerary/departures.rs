//! Departure board lines

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::planner::Departure;

/// Shifts within this window count as on time
const ON_TIME_WINDOW: TimeDelta = TimeDelta::seconds(30);

/// Offset timestamps are converted to `tz`; bare ones are already local
fn parse_local(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&tz));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    tz.from_local_datetime(&naive).earliest()
}

/// `on time`, `+Nm` or `EARLY −Nm`, minutes truncated
fn status(scheduled: DateTime<Tz>, expected: DateTime<Tz>) -> String {
    let delta = expected - scheduled;
    if delta < -ON_TIME_WINDOW {
        format!("EARLY −{}m", (-delta).num_minutes())
    } else if delta > ON_TIME_WINDOW {
        format!("+{}m", delta.num_minutes())
    } else {
        "on time".to_string()
    }
}

/// `HH:MM <direction> (<status>)`, timed by the expected departure
///
/// A time that does not parse is shown as delivered and the status is left out.
pub fn format_departure(departure: &Departure, tz: Tz) -> String {
    let scheduled = parse_local(&departure.scheduled, tz);
    let expected = parse_local(&departure.expected, tz);

    match (scheduled, expected) {
        (Some(s), Some(e)) => format!("{} {} ({})", e.format("%H:%M"), departure.direction, status(s, e)),
        (_, Some(e)) => format!("{} {}", e.format("%H:%M"), departure.direction),
        (Some(s), None) => format!("{} {}", s.format("%H:%M"), departure.direction),
        (None, None) => {
            let raw = if departure.expected.trim().is_empty() {
                &departure.scheduled
            } else {
                &departure.expected
            };
            format!("{} {}", raw.trim(), departure.direction)
        }
    }
}

/// The first `count` departures, one per line
pub fn format_departures(departures: &[Departure], count: usize, tz: Tz) -> String {
    departures
        .iter()
        .take(count)
        .map(|d| format_departure(d, tz))
        .collect::<Vec<_>>()
        .join("\n")
}
