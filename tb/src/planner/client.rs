//! Search traits consumed by the bot core

use async_trait::async_trait;
use prefstore::RoutePriority;

use super::{Candidate, Journey, PlannerError};

/// Free-text location lookup
#[async_trait]
pub trait LocationSearch: Send + Sync {
    /// Best matches for `query`, best first, at most `limit` when `limit > 0`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, PlannerError>;
}

/// Itinerary lookup between two location references
#[async_trait]
pub trait TripSearch: Send + Sync {
    /// Journeys from `origin` to `destination`, best first
    async fn trips(
        &self,
        origin: &str,
        destination: &str,
        count: usize,
        priority: Option<RoutePriority>,
    ) -> Result<Vec<Journey>, PlannerError>;
}
