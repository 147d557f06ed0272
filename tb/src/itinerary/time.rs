//! Timestamp conversion and delay computation

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

/// Parse an ISO-8601 instant with offset; fractional seconds are optional
fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// `HH:MM` in `tz`, or the raw text unchanged when it is not a valid instant
pub fn local_time(raw: &str, tz: Tz) -> String {
    match parse_instant(raw) {
        Some(t) => t.with_timezone(&tz).format("%H:%M").to_string(),
        None => raw.to_string(),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Departure text comparing planned and estimated times
///
/// Returns `None` when neither time is known. A single known time is shown as
/// on time. Minute differences truncate toward zero, so a sub-minute shift that
/// still changes the displayed minute falls back to the unquantified form.
pub fn departure_line(planned: Option<&str>, estimated: Option<&str>, tz: Tz) -> Option<String> {
    let planned = present(planned);
    let estimated = present(estimated);

    let (planned_raw, estimated_raw) = match (planned, estimated) {
        (None, None) => return None,
        (Some(p), None) => (p, p),
        (None, Some(e)) => (e, e),
        (Some(p), Some(e)) => (p, e),
    };

    let planned_time = local_time(planned_raw, tz);
    let estimated_time = local_time(estimated_raw, tz);

    if planned_time == estimated_time {
        return Some(format!("Depart: {} (on time)", estimated_time));
    }

    if let (Some(p), Some(e)) = (parse_instant(planned_raw), parse_instant(estimated_raw)) {
        let delta = (e - p).num_minutes();
        if delta > 0 {
            return Some(format!("Depart: {} → ⚠ {} (+{} min)", planned_time, estimated_time, delta));
        }
        if delta < 0 {
            return Some(format!("Depart: {} → {} ({} min early)", planned_time, estimated_time, delta));
        }
    }

    Some(format!("Depart: {} → ⚠ {}", planned_time, estimated_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Stockholm;

    #[test]
    fn test_local_time_converts_to_zone() {
        assert_eq!(local_time("2026-01-03T08:00:00Z", Stockholm), "09:00");
        // Summer time: UTC+2
        assert_eq!(local_time("2026-07-03T08:00:00Z", Stockholm), "10:00");
        assert_eq!(local_time("2026-01-03T09:15:00+01:00", Stockholm), "09:15");
    }

    #[test]
    fn test_local_time_fractional_seconds() {
        assert_eq!(local_time("2026-01-03T08:00:59.123Z", Stockholm), "09:00");
    }

    #[test]
    fn test_local_time_passes_through_garbage() {
        assert_eq!(local_time("tomorrow-ish", Stockholm), "tomorrow-ish");
        assert_eq!(local_time("08:00", Stockholm), "08:00");
    }

    #[test]
    fn test_delay_positive() {
        let line = departure_line(Some("2026-01-03T08:00:00Z"), Some("2026-01-03T08:03:00Z"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:00 → ⚠ 09:03 (+3 min)"));
    }

    #[test]
    fn test_delay_negative() {
        let line = departure_line(Some("2026-01-03T08:05:00Z"), Some("2026-01-03T08:03:00Z"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:05 → 09:03 (-2 min early)"));
    }

    #[test]
    fn test_equal_times_on_time() {
        let line = departure_line(Some("2026-01-03T08:10:00Z"), Some("2026-01-03T08:10:00Z"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:10 (on time)"));
    }

    #[test]
    fn test_same_minute_differing_seconds_on_time() {
        let line = departure_line(Some("2026-01-03T08:10:05Z"), Some("2026-01-03T08:10:40Z"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:10 (on time)"));
    }

    #[test]
    fn test_single_time_on_time() {
        assert_eq!(
            departure_line(Some("2026-01-03T08:30:00Z"), None, Stockholm).as_deref(),
            Some("Depart: 09:30 (on time)")
        );
        assert_eq!(
            departure_line(None, Some("2026-01-03T08:31:00Z"), Stockholm).as_deref(),
            Some("Depart: 09:31 (on time)")
        );
        assert_eq!(
            departure_line(Some(""), Some("2026-01-03T08:31:00Z"), Stockholm).as_deref(),
            Some("Depart: 09:31 (on time)")
        );
    }

    #[test]
    fn test_no_times_no_line() {
        assert_eq!(departure_line(None, None, Stockholm), None);
        assert_eq!(departure_line(Some(""), Some("  "), Stockholm), None);
    }

    #[test]
    fn test_sub_minute_shift_across_boundary_falls_back() {
        let line = departure_line(Some("2026-01-03T08:00:50Z"), Some("2026-01-03T08:01:10Z"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:00 → ⚠ 09:01"));
    }

    #[test]
    fn test_unparseable_falls_back_without_number() {
        let line = departure_line(Some("2026-01-03T08:00:00Z"), Some("soon"), Stockholm);
        assert_eq!(line.as_deref(), Some("Depart: 09:00 → ⚠ soon"));
    }
}
