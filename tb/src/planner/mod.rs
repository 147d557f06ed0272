//! Journey planner integration
//!
//! Location search and trip search as traits, the HTTP client that backs them,
//! and the response types shared with the formatter. The SL Transport API
//! client supplies the site list and realtime departures.

mod client;
mod error;
mod fixtures;
mod journey_planner;
mod sites;
mod transport_api;
mod types;

#[cfg(test)]
pub use client::mock;
pub use client::{LocationSearch, TripSearch};
pub use error::PlannerError;
pub use journey_planner::JourneyPlannerClient;
pub use sites::{SiteIndex, load_cache, load_site_index, save_cache};
pub use transport_api::{Departure, Site, SiteList, StopArea, TransportApiClient};
pub use types::{
    Candidate, Coordinate, Journey, Leg, LegPoint, LocationKind, Product, Ref, StopFinderResponse, SystemMessage,
    Transportation, TripsResponse,
};
