//! HTTP client for the SL Journey Planner v2 API
//!
//! Implements [`LocationSearch`] via `/stop-finder` and [`TripSearch`] via
//! `/trips`. In dry-run mode no request leaves the process and built-in
//! fixtures are returned instead.

use std::time::Duration;

use async_trait::async_trait;
use prefstore::RoutePriority;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::fixtures;
use super::{Candidate, Journey, LocationSearch, PlannerError, StopFinderResponse, TripSearch, TripsResponse};
use crate::config::PlannerConfig;

/// Stops + streets/addresses + POIs
const ANY_OBJ_FILTER: &str = "46";

/// The backend never returns more than this many trips per request
const MAX_TRIPS: usize = 3;

/// Journey Planner API client, safe for concurrent use
pub struct JourneyPlannerClient {
    base_url: String,
    http: Client,
    timeout: Duration,
    dry_run: bool,
}

impl JourneyPlannerClient {
    /// Create a new client from configuration
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        debug!(?config, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("transitbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PlannerError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
            dry_run: config.dry_run,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, PlannerError> {
        let url = format!("{}{}", self.base_url, path);
        get_json(&self.http, &url, query, self.timeout).await
    }
}

/// GET `url` and decode a JSON body, mapping non-success statuses to [`PlannerError::Status`]
pub(super) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
    timeout: Duration,
) -> Result<T, PlannerError> {
    debug!(%url, ?query, "get_json: sending request");

    let response = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| PlannerError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(%url, status = status.as_u16(), %body, "get_json: non-success status");
        return Err(PlannerError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| PlannerError::from_reqwest(e, timeout))?;
    debug!(body_len = body.len(), "get_json: response body read");
    Ok(serde_json::from_str(&body)?)
}

/// Number of trips to request: 0 means the default, anything else is capped
fn clamp_trip_count(count: usize) -> usize {
    if count == 0 { MAX_TRIPS } else { count.min(MAX_TRIPS) }
}

#[async_trait]
impl LocationSearch for JourneyPlannerClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, PlannerError> {
        debug!(%query, limit, dry_run = self.dry_run, "search: called");
        let mut locations = if self.dry_run {
            fixtures::stop_finder()
        } else {
            let params = [
                ("name_sf", query.to_string()),
                ("type_sf", "any".to_string()),
                ("any_obj_filter_sf", ANY_OBJ_FILTER.to_string()),
            ];
            let response: StopFinderResponse = self.get("/stop-finder", &params).await?;
            for msg in response.system_messages.iter().filter(|m| m.kind == "error") {
                debug!(code = msg.code, text = %msg.text, "search: backend system message");
            }
            response.locations
        };

        if limit > 0 {
            locations.truncate(limit);
        }
        Ok(locations)
    }
}

#[async_trait]
impl TripSearch for JourneyPlannerClient {
    async fn trips(
        &self,
        origin: &str,
        destination: &str,
        count: usize,
        priority: Option<RoutePriority>,
    ) -> Result<Vec<Journey>, PlannerError> {
        debug!(%origin, %destination, count, ?priority, dry_run = self.dry_run, "trips: called");
        if self.dry_run {
            let mut journeys = fixtures::trips(origin, destination);
            if count > 0 {
                journeys.truncate(count);
            }
            return Ok(journeys);
        }

        let mut params = vec![
            ("type_origin", "any".to_string()),
            ("type_destination", "any".to_string()),
            ("name_origin", origin.to_string()),
            ("name_destination", destination.to_string()),
            ("calc_number_of_trips", clamp_trip_count(count).to_string()),
            ("calc_one_direction", "true".to_string()),
            ("language", "en".to_string()),
        ];
        if let Some(priority) = priority {
            params.push(("routeType", priority.as_str().to_string()));
        }

        let response: TripsResponse = self.get("/trips", &params).await?;
        debug!(journey_count = response.journeys.len(), "trips: received");
        Ok(response.journeys)
    }
}
