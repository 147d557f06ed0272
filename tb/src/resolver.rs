//! Candidate resolution for free-text location queries

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::planner::{Candidate, LocationSearch, PlannerError};

/// Default deadline for a single location lookup
pub const LOOKUP_DEADLINE: Duration = Duration::from_secs(10);

/// Lookup failure from the search backend
#[derive(Debug, Error)]
#[error("Location lookup failed: {0}")]
pub struct LookupFailed(#[from] pub PlannerError);

/// What a query resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Empty or whitespace-only query; nothing was looked up
    InvalidQuery,
    NoMatches,
    Single(Candidate),
    /// Two or more candidates, best first
    Multiple(Vec<Candidate>),
}

/// Turns a query into zero, one or many candidates via a [`LocationSearch`]
///
/// Ranking is whatever the search backend provides. A lookup that outlives
/// the deadline counts as a failed lookup.
#[derive(Clone)]
pub struct CandidateResolver {
    search: Arc<dyn LocationSearch>,
    limit: usize,
    deadline: Duration,
}

impl CandidateResolver {
    pub fn new(search: Arc<dyn LocationSearch>, limit: usize) -> Self {
        Self {
            search,
            limit,
            deadline: LOOKUP_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, PlannerError> {
        tokio::time::timeout(self.deadline, self.search.search(query, limit))
            .await
            .unwrap_or_else(|_| Err(PlannerError::Timeout(self.deadline)))
    }

    /// Resolve `query` with the configured result cap
    pub async fn resolve(&self, query: &str) -> Result<Resolution, LookupFailed> {
        self.resolve_with_limit(query, self.limit).await
    }

    pub async fn resolve_with_limit(&self, query: &str, limit: usize) -> Result<Resolution, LookupFailed> {
        let query = query.trim();
        if query.is_empty() {
            debug!("resolve: empty query");
            return Ok(Resolution::InvalidQuery);
        }

        let mut found = self.lookup(query, limit).await.map_err(|e| {
            warn!(%query, error = %e, "resolve: location search failed");
            LookupFailed(e)
        })?;
        if limit > 0 {
            found.truncate(limit);
        }
        debug!(%query, count = found.len(), "resolve: candidates found");

        Ok(match found.len() {
            0 => Resolution::NoMatches,
            1 => Resolution::Single(found.remove(0)),
            _ => Resolution::Multiple(found),
        })
    }

    /// Display name for a stored reference: the first match's name, or the
    /// reference itself when the lookup fails or finds nothing
    pub async fn label(&self, reference: &str) -> String {
        let reference = reference.trim();
        if reference.is_empty() {
            return String::new();
        }
        match self.lookup(reference, 1).await {
            Ok(found) => found
                .into_iter()
                .next()
                .map(|c| c.name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| reference.to_string()),
            Err(e) => {
                debug!(%reference, error = %e, "label: lookup failed, using raw reference");
                reference.to_string()
            }
        }
    }
}
