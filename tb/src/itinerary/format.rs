//! Journey and leg rendering

use std::fmt::Write;

use chrono_tz::Tz;
use tracing::debug;

use super::time::{departure_line, local_time};
use crate::domain::TransportMode;
use crate::planner::{Journey, Leg};

/// Text rendered for an empty journey list
pub const NO_JOURNEYS: &str = "No journeys found.";

/// Line printed above every option
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━";

/// Placeholder for missing stop names
pub const UNKNOWN_NAME: &str = "(unknown)";

/// Options shown when the caller asks for none
pub const DEFAULT_JOURNEY_COUNT: usize = 3;

/// Whole minutes, rounded up
pub fn duration_minutes(seconds: u64) -> u64 {
    seconds.div_ceil(60)
}

fn name_or_unknown(name: &str) -> &str {
    if name.trim().is_empty() { UNKNOWN_NAME } else { name }
}

/// Renders journeys as chat text in a fixed display timezone
///
/// Pure: the same input always yields the same text.
#[derive(Debug, Clone, Copy)]
pub struct ItineraryFormatter {
    tz: Tz,
}

impl ItineraryFormatter {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Render up to `count` journeys (0 means [`DEFAULT_JOURNEY_COUNT`])
    pub fn format_journeys(&self, journeys: &[Journey], count: usize) -> String {
        let requested = if count == 0 { DEFAULT_JOURNEY_COUNT } else { count };
        let shown = requested.min(journeys.len());
        debug!(requested, available = journeys.len(), shown, "format_journeys: called");

        if shown == 0 {
            return NO_JOURNEYS.to_string();
        }

        let mut out = String::new();
        for (i, journey) in journeys.iter().take(shown).enumerate() {
            self.write_journey(&mut out, i + 1, journey);
        }
        out.trim().to_string()
    }

    fn write_journey(&self, out: &mut String, option: usize, journey: &Journey) {
        out.push_str(SEPARATOR);
        out.push('\n');

        let minutes = duration_minutes(journey.effective_duration());
        match self.arrival_time(journey) {
            Some(arrives) => {
                let _ = write!(out, "Option {} ({} min, arrives {})\n\n", option, minutes, arrives);
            }
            None => {
                let _ = write!(out, "Option {} ({} min)\n\n", option, minutes);
            }
        }

        for leg in &journey.legs {
            out.push_str(&self.format_leg(leg));
            out.push('\n');
        }
        out.push('\n');
    }

    /// Final arrival, scanning legs from the end; estimated wins over planned
    fn arrival_time(&self, journey: &Journey) -> Option<String> {
        journey.legs.iter().rev().find_map(|leg| {
            let dest = &leg.destination;
            [&dest.arrival_time_estimated, &dest.arrival_time_planned]
                .into_iter()
                .flatten()
                .find(|t| !t.trim().is_empty())
                .map(|t| local_time(t, self.tz))
        })
    }

    /// Render a single leg (trailing newline included)
    pub fn format_leg(&self, leg: &Leg) -> String {
        let mut out = String::new();
        let route = format!(
            "  {} → {}\n",
            name_or_unknown(&leg.origin.name),
            name_or_unknown(&leg.destination.name)
        );

        if leg.mode.is_walk() {
            let _ = writeln!(out, "{} Walk {} min", leg.mode.icon(), duration_minutes(leg.duration));
            out.push_str(&route);
            return out;
        }

        let line = leg
            .transportation
            .as_ref()
            .map(|t| t.number.trim())
            .unwrap_or_default();
        let direction = leg.transportation.as_ref().and_then(|t| t.direction());

        let header = match (&leg.mode, direction) {
            (TransportMode::Other(_), _) if line.is_empty() => leg.mode.title(),
            (TransportMode::Other(_), Some(dir)) => format!("{} {} → {}", leg.mode.title(), line, dir),
            (TransportMode::Other(_), None) => format!("{} {}", leg.mode.title(), line),
            (_, Some(dir)) => format!("{} → {}", line, dir),
            (_, None) => line.to_string(),
        };
        let _ = writeln!(out, "{} {}", leg.mode.icon(), header);

        if let Some(depart) = departure_line(
            leg.origin.departure_time_planned.as_deref(),
            leg.origin.departure_time_estimated.as_deref(),
            self.tz,
        ) {
            let _ = writeln!(out, "  {}", depart);
        }
        out.push_str(&route);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{LegPoint, Transportation};
    use chrono_tz::Europe::Stockholm;
    use proptest::prelude::*;

    fn formatter() -> ItineraryFormatter {
        ItineraryFormatter::new(Stockholm)
    }

    fn bus_journey() -> Journey {
        Journey {
            trip_id: "t1".to_string(),
            trip_duration: 18 * 60,
            trip_rt_duration: 19 * 60,
            interchanges: 0,
            legs: vec![
                Leg::walk(4 * 60, LegPoint::named("Home"), LegPoint::named("Storgatan")),
                Leg::new(
                    15 * 60,
                    LegPoint::named("Storgatan").departing(Some("2026-01-03T08:00:00Z"), Some("2026-01-03T08:02:00Z")),
                    LegPoint::named("Work").arriving(Some("2026-01-03T08:15:00Z"), Some("2026-01-03T08:17:00Z")),
                    Some(Transportation::new("Bus", "515").towards("Odenplan")),
                ),
            ],
        }
    }

    #[test]
    fn test_empty_list_sentinel() {
        assert_eq!(formatter().format_journeys(&[], 3), "No journeys found.");
        assert_eq!(formatter().format_journeys(&[], 0), "No journeys found.");
    }

    #[test]
    fn test_duration_ceiling() {
        assert_eq!(duration_minutes(0), 0);
        assert_eq!(duration_minutes(1), 1);
        assert_eq!(duration_minutes(179), 3);
        assert_eq!(duration_minutes(180), 3);
        assert_eq!(duration_minutes(181), 4);
    }

    proptest! {
        #[test]
        fn prop_duration_is_smallest_covering_minute(secs in 0u64..10_000_000) {
            let m = duration_minutes(secs);
            prop_assert!(m * 60 >= secs);
            prop_assert!(m == 0 || (m - 1) * 60 < secs);
        }
    }

    #[test]
    fn test_full_journey_rendering() {
        let text = formatter().format_journeys(&[bus_journey()], 3);
        let expected = [
            SEPARATOR,
            "Option 1 (19 min, arrives 09:17)",
            "",
            "🚶 Walk 4 min",
            "  Home → Storgatan",
            "",
            "🚌 515 → Odenplan",
            "  Depart: 09:00 → ⚠ 09:02 (+2 min)",
            "  Storgatan → Work",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_count_clamping_and_default() {
        let journeys = vec![bus_journey(), bus_journey(), bus_journey(), bus_journey()];
        let f = formatter();
        assert_eq!(f.format_journeys(&journeys, 2).matches(SEPARATOR).count(), 2);
        assert_eq!(f.format_journeys(&journeys, 0).matches(SEPARATOR).count(), 3);
        assert_eq!(f.format_journeys(&journeys[..1], 5).matches(SEPARATOR).count(), 1);
        assert!(f.format_journeys(&journeys, 0).contains("Option 3 "));
        assert!(!f.format_journeys(&journeys, 0).contains("Option 4 "));
    }

    #[test]
    fn test_arrival_falls_back_to_planned_and_earlier_legs() {
        let mut journey = bus_journey();
        journey.legs[1].destination.arrival_time_estimated = None;
        let text = formatter().format_journeys(&[journey.clone()], 1);
        assert!(text.contains("arrives 09:15"));

        // Trailing walk without times: arrival comes from the bus leg
        journey.legs.push(Leg::walk(120, LegPoint::named("Work"), LegPoint::named("Desk")));
        let text = formatter().format_journeys(&[journey], 1);
        assert!(text.contains("Option 1 (19 min, arrives 09:15)"));
    }

    #[test]
    fn test_header_without_arrival() {
        let journey = Journey {
            trip_duration: 181,
            legs: vec![Leg::walk(181, LegPoint::named("A"), LegPoint::named("B"))],
            ..Default::default()
        };
        let text = formatter().format_journeys(&[journey], 1);
        assert!(text.contains("Option 1 (4 min)\n"));
    }

    #[test]
    fn test_missing_names_render_placeholder() {
        let leg = Leg::walk(60, LegPoint::default(), LegPoint::named("B"));
        assert_eq!(formatter().format_leg(&leg), "🚶 Walk 1 min\n  (unknown) → B\n");

        let leg = Leg::new(
            300,
            LegPoint::named("A"),
            LegPoint::default(),
            Some(Transportation::new("Tram", "30")),
        );
        assert_eq!(formatter().format_leg(&leg), "🚊 30\n  A → (unknown)\n");
    }

    #[test]
    fn test_metro_on_time() {
        let leg = Leg::new(
            600,
            LegPoint::named("Stop A").departing(Some("2026-01-03T08:10:00Z"), Some("2026-01-03T08:10:00Z")),
            LegPoint::named("Stop B"),
            Some(Transportation::new("Metro", "11").towards("Akalla")),
        );
        assert_eq!(
            formatter().format_leg(&leg),
            "🚇 11 → Akalla\n  Depart: 09:10 (on time)\n  Stop A → Stop B\n"
        );
    }

    #[test]
    fn test_footpath_product_is_walk() {
        let leg = Leg::new(
            90,
            LegPoint::named("A"),
            LegPoint::named("B"),
            Some(Transportation::new("footpath", "")),
        );
        assert_eq!(formatter().format_leg(&leg), "🚶 Walk 2 min\n  A → B\n");
    }

    #[test]
    fn test_unknown_mode_generic_icon() {
        let with_dir = Leg::new(
            600,
            LegPoint::named("Odenplan").departing(Some("2026-01-03T08:00:00Z"), None),
            LegPoint::named("Uppsala C"),
            Some(Transportation::new("commuter train", "40").towards("Uppsala C")),
        );
        assert_eq!(
            formatter().format_leg(&with_dir),
            "🚆 Commuter Train 40 → Uppsala C\n  Depart: 09:00 (on time)\n  Odenplan → Uppsala C\n"
        );

        let no_line = Leg::new(
            600,
            LegPoint::named("Slussen"),
            LegPoint::named("Djurgården"),
            Some(Transportation::new("Ferry", "").towards("Djurgården")),
        );
        assert_eq!(formatter().format_leg(&no_line), "🚆 Ferry\n  Slussen → Djurgården\n");

        let no_dir = Leg::new(
            600,
            LegPoint::named("A"),
            LegPoint::named("B"),
            Some(Transportation::new("Ship", "80")),
        );
        assert_eq!(formatter().format_leg(&no_dir), "🚆 Ship 80\n  A → B\n");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let journeys = vec![bus_journey(), bus_journey()];
        let f = formatter();
        assert_eq!(f.format_journeys(&journeys, 3), f.format_journeys(&journeys, 3));
    }
}
