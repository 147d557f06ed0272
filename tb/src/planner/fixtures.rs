//! Offline fixtures served in dry-run mode

use super::{Candidate, Journey, Leg, LegPoint, LocationKind, Transportation};

pub(crate) fn stop_finder() -> Vec<Candidate> {
    vec![
        Candidate::new("dry:home", "Storgatan", LocationKind::Address),
        Candidate::new("dry:work", "Frösunda torg", LocationKind::Stop),
        Candidate::new("dry:alt", "Odenplan", LocationKind::Stop),
    ]
}

pub(crate) fn trips(origin: &str, destination: &str) -> Vec<Journey> {
    vec![
        Journey {
            trip_id: "dry:1".to_string(),
            trip_duration: 18 * 60,
            trip_rt_duration: 19 * 60,
            interchanges: 0,
            legs: vec![
                Leg::walk(4 * 60, LegPoint::named(origin), LegPoint::named("Storgatan")),
                Leg::new(
                    15 * 60,
                    LegPoint::named("Storgatan").departing(Some("2026-01-03T08:00:00Z"), Some("2026-01-03T08:02:00Z")),
                    LegPoint::named(destination).arriving(Some("2026-01-03T08:15:00Z"), Some("2026-01-03T08:17:00Z")),
                    Some(Transportation::new("Bus", "515")),
                ),
            ],
        },
        Journey {
            trip_id: "dry:2".to_string(),
            trip_duration: 22 * 60,
            trip_rt_duration: 22 * 60,
            interchanges: 1,
            legs: vec![
                Leg::walk(3 * 60, LegPoint::named(origin), LegPoint::named("Stop A")),
                Leg::new(
                    10 * 60,
                    LegPoint::named("Stop A").departing(Some("2026-01-03T08:10:00Z"), Some("2026-01-03T08:10:00Z")),
                    LegPoint::named("Stop B").arriving(Some("2026-01-03T08:20:00Z"), Some("2026-01-03T08:20:00Z")),
                    Some(Transportation::new("Metro", "11")),
                ),
                Leg::walk(9 * 60, LegPoint::named("Stop B"), LegPoint::named(destination)),
            ],
        },
        Journey {
            trip_id: "dry:3".to_string(),
            trip_duration: 25 * 60,
            trip_rt_duration: 24 * 60,
            interchanges: 0,
            legs: vec![Leg::new(
                25 * 60,
                LegPoint::named(origin).departing(Some("2026-01-03T08:30:00Z"), None),
                LegPoint::named(destination).arriving(Some("2026-01-03T08:55:00Z"), None),
                Some(Transportation::new("Bus", "515")),
            )],
        },
    ]
}
