//! HTTP client for the SL Transport API v1
//!
//! Serves the full site list (`/sites`) and realtime departures for one site
//! (`/sites/{id}/departures`). In dry-run mode the site list is a short
//! built-in one and departures are read from `<fixtures-dir>/<siteId>.json`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::PlannerError;
use super::journey_planner::get_json;
use crate::config::SitesConfig;

/// A stop or station from the site list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "siteId", alias = "id")]
    pub site_id: i64,
    /// `STOP_AREA`, `STATION`, ...; the live API omits it
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl Site {
    pub fn new(name: impl Into<String>, site_id: i64, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            site_id,
            kind: kind.into(),
        }
    }
}

// The live API returns a bare array; older responses wrap it
#[derive(Deserialize)]
#[serde(untagged)]
enum SitesBody {
    List(Vec<Site>),
    Wrapped { sites: Vec<Site> },
}

/// Stop area a departure leaves from
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StopArea {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "siteId", alias = "id")]
    pub site_id: i64,
}

/// One realtime departure; times are local wall-clock or offset timestamps
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    #[serde(default)]
    pub scheduled: String,
    #[serde(default)]
    pub expected: String,
    /// Line designation, e.g. `"515"`
    #[serde(default, deserialize_with = "line_designation")]
    pub line: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default, alias = "display")]
    pub display_text: String,
    #[serde(default, alias = "stop_area")]
    pub stop_area: StopArea,
}

#[derive(Debug, Default, Deserialize)]
struct DeparturesResponse {
    #[serde(default)]
    departures: Vec<Departure>,
}

fn line_designation<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LineWire {
        Plain(String),
        Line {
            #[serde(default)]
            designation: String,
        },
    }

    Ok(match LineWire::deserialize(deserializer)? {
        LineWire::Plain(s) => s,
        LineWire::Line { designation } => designation,
    })
}

/// Source of the full site list
#[async_trait]
pub trait SiteList: Send + Sync {
    async fn sites(&self) -> Result<Vec<Site>, PlannerError>;
}

/// SL Transport API client, safe for concurrent use
pub struct TransportApiClient {
    base_url: String,
    http: Client,
    timeout: Duration,
    dry_run: bool,
    fixtures_dir: PathBuf,
}

impl TransportApiClient {
    pub fn from_config(config: &SitesConfig, dry_run: bool) -> Result<Self, PlannerError> {
        debug!(?config, dry_run, "from_config: called");
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
            dry_run,
            fixtures_dir: config.fixtures_dir.clone(),
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Upcoming departures from `site_id`, in backend order
    pub async fn departures(&self, site_id: i64) -> Result<Vec<Departure>, PlannerError> {
        debug!(site_id, dry_run = self.dry_run, "departures: called");
        let response: DeparturesResponse = if self.dry_run {
            let path = self.fixtures_dir.join(format!("{}.json", site_id));
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| PlannerError::Fixture {
                    path: path.display().to_string(),
                    source,
                })?;
            serde_json::from_str(&content)?
        } else {
            let url = format!("{}/sites/{}/departures", self.base_url, site_id);
            get_json(&self.http, &url, &[], self.timeout).await?
        };
        debug!(count = response.departures.len(), "departures: received");
        Ok(response.departures)
    }
}

#[async_trait]
impl SiteList for TransportApiClient {
    async fn sites(&self) -> Result<Vec<Site>, PlannerError> {
        debug!(dry_run = self.dry_run, "sites: called");
        if self.dry_run {
            return Ok(vec![
                Site::new("Storgatan", 3484, "STOP_AREA"),
                Site::new("Frösunda torg", 3455, "STOP_AREA"),
                Site::new("Solna centrum norra", 3472, "STOP_AREA"),
                Site::new("Solna centrum", 9305, "STOP_AREA"),
            ]);
        }

        let url = format!("{}/sites", self.base_url);
        let body: SitesBody = get_json(&self.http, &url, &[], self.timeout).await?;
        let sites = match body {
            SitesBody::List(sites) | SitesBody::Wrapped { sites } => sites,
        };
        debug!(count = sites.len(), "sites: received");
        Ok(sites)
    }
}
