//! In-memory site list with case-insensitive substring matching
//!
//! Used where the upstream search has no ranking of its own: a fixed list of
//! sites is filtered locally and served through [`LocationSearch`]. The list
//! is fetched once at startup and mirrored to a cache file that stands in for
//! it when the fetch fails.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use super::{Candidate, LocationKind, LocationSearch, PlannerError, Site, SiteList};

impl From<Site> for Candidate {
    fn from(site: Site) -> Self {
        let kind = if site.kind.is_empty() {
            LocationKind::Stop
        } else {
            LocationKind::from(site.kind)
        };
        Candidate::new(site.site_id.to_string(), site.name, kind)
    }
}

/// A fixed, ordered list of sites
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    sites: Vec<Candidate>,
}

impl SiteIndex {
    pub fn new(sites: Vec<Candidate>) -> Self {
        debug!(site_count = sites.len(), "SiteIndex::new: called");
        Self { sites }
    }

    pub fn from_sites(sites: Vec<Site>) -> Self {
        Self::new(sites.into_iter().map(Candidate::from).collect())
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sites whose lower-cased name contains the lower-cased query, in source order,
    /// capped at `count`
    pub fn matching(&self, query: &str, count: usize) -> Vec<Candidate> {
        let query = query.to_lowercase();
        self.sites
            .iter()
            .filter(|site| site.name.to_lowercase().contains(&query))
            .take(count)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LocationSearch for SiteIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, PlannerError> {
        let count = if limit == 0 { self.sites.len() } else { limit };
        Ok(self.matching(query, count))
    }
}

/// Fetch the site list, refreshing the cache at `cache_path`
///
/// Falls back to the cached list when the fetch fails, and to an empty index
/// when there is no usable cache either.
pub async fn load_site_index(source: &dyn SiteList, cache_path: &Path) -> SiteIndex {
    match source.sites().await {
        Ok(sites) => {
            match save_cache(cache_path, &sites) {
                Ok(()) => info!(count = sites.len(), path = %cache_path.display(), "Wrote site cache"),
                Err(e) => warn!(error = %e, "load_site_index: failed to write site cache"),
            }
            SiteIndex::from_sites(sites)
        }
        Err(e) => {
            warn!(error = %e, "load_site_index: could not fetch site list, using cache");
            match load_cache(cache_path) {
                Ok(sites) => {
                    info!(count = sites.len(), path = %cache_path.display(), "Loaded cached site list");
                    SiteIndex::from_sites(sites)
                }
                Err(e) => {
                    warn!(error = %e, "load_site_index: no usable site cache, location search will find nothing");
                    SiteIndex::default()
                }
            }
        }
    }
}

pub fn load_cache(path: &Path) -> Result<Vec<Site>> {
    let content = fs::read_to_string(path).context(format!("Failed to read site cache: {}", path.display()))?;
    serde_json::from_str(&content).context(format!("Failed to parse site cache: {}", path.display()))
}

pub fn save_cache(path: &Path, sites: &[Site]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context(format!("Failed to create cache directory: {}", dir.display()))?;
    }
    let data = serde_json::to_string_pretty(sites)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, data).context("Failed to write temporary site cache")?;
    fs::rename(&tmp_path, path).context(format!("Failed to replace site cache: {}", path.display()))?;
    Ok(())
}
