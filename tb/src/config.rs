//! TransitBot configuration types and loading

use chrono_tz::Tz;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main TransitBot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat transport configuration
    pub telegram: TelegramConfig,

    /// Journey planner backend configuration
    pub planner: PlannerConfig,

    /// SL Transport API: site list and departures
    pub sites: SitesConfig,

    /// Fallback locations for users who saved none
    pub defaults: DefaultsConfig,

    /// Itinerary presentation
    pub display: DisplayConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before running the bot
    ///
    /// Checks that the display timezone is known, that backend calls time out
    /// before the update that made them, and that the bot token is available.
    pub fn validate(&self) -> Result<()> {
        self.display.timezone()?;
        if self.planner.timeout_ms >= self.telegram.update_timeout_ms {
            return Err(eyre::eyre!(
                "planner.timeout-ms ({}) must be lower than telegram.update-timeout-ms ({})",
                self.planner.timeout_ms,
                self.telegram.update_timeout_ms
            ));
        }
        if std::env::var(&self.telegram.token_env).map(|t| t.trim().is_empty()).unwrap_or(true) {
            return Err(eyre::eyre!(
                "Bot token not found. Set the {} environment variable.",
                self.telegram.token_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .transitbot.yml
        let local_config = PathBuf::from(".transitbot.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/transitbot/transitbot.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("transitbot").join("transitbot.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if std::env::var("SL_DRY_RUN").is_ok_and(|v| v == "1") {
            self.planner.dry_run = true;
        }
        if let Some(home) = non_empty_env("HOME_SITE_ID") {
            self.defaults.home = Some(home);
        }
        if let Some(work) = non_empty_env("WORK_SITE_ID") {
            self.defaults.work = Some(work);
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Environment variable containing the bot token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Long-poll timeout passed to getUpdates
    #[serde(rename = "poll-timeout-secs")]
    pub poll_timeout_secs: u64,

    /// Deadline for handling a single update
    #[serde(rename = "update-timeout-ms")]
    pub update_timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 60,
            update_timeout_ms: 30_000,
        }
    }
}

impl TelegramConfig {
    /// Read the bot token from the configured environment variable
    pub fn token(&self) -> Result<String> {
        std::env::var(&self.token_env).context(format!("{} not set", self.token_env))
    }
}

/// Journey planner backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Serve built-in fixtures instead of calling the backend
    #[serde(rename = "dry-run")]
    pub dry_run: bool,

    /// Maximum candidates offered for a location query
    #[serde(rename = "search-limit")]
    pub search_limit: usize,

    /// Where `/sethome` and `/setwork` look locations up
    #[serde(rename = "location-source")]
    pub location_source: LocationSource,
}

/// Backend for free-text location queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
    /// Journey planner `/stop-finder`: stops, addresses and POIs
    #[default]
    StopFinder,
    /// The SL site list fetched at startup, matched by name substring
    SiteList,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://journeyplanner.integration.sl.se/v2".to_string(),
            timeout_ms: 10_000,
            dry_run: false,
            search_limit: 5,
            location_source: LocationSource::StopFinder,
        }
    }
}

/// SL Transport API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Last fetched site list, used when the fetch fails
    #[serde(rename = "cache-path")]
    pub cache_path: PathBuf,

    /// Directory of `<siteId>.json` departure fixtures for dry-run mode
    #[serde(rename = "fixtures-dir")]
    pub fixtures_dir: PathBuf,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://transport.integration.sl.se/v1".to_string(),
            timeout_ms: 10_000,
            cache_path: PathBuf::from("data/sites_cache.json"),
            fixtures_dir: PathBuf::from("fixtures"),
        }
    }
}

/// Fallback locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Home location reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,

    /// Work location reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

/// Itinerary presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA timezone used for all displayed times
    pub timezone: String,

    /// Number of journeys shown per request
    #[serde(rename = "journey-count")]
    pub journey_count: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Stockholm".to_string(),
            journey_count: 3,
        }
    }
}

impl DisplayConfig {
    /// Parse the configured timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| eyre::eyre!("Invalid timezone '{}': {}", self.timezone, e))
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Preferences JSON file
    #[serde(rename = "prefs-path")]
    pub prefs_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefs_path: PathBuf::from(prefstore::DEFAULT_PREFS_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.telegram.token_env, "TELEGRAM_BOT_TOKEN");
        assert_eq!(config.telegram.poll_timeout_secs, 60);
        assert_eq!(config.planner.search_limit, 5);
        assert!(!config.planner.dry_run);
        assert_eq!(config.display.journey_count, 3);
        assert_eq!(config.display.timezone().unwrap(), chrono_tz::Europe::Stockholm);
        assert_eq!(config.storage.prefs_path, PathBuf::from("data/userprefs.json"));
        assert_eq!(config.planner.location_source, LocationSource::StopFinder);
        assert_eq!(config.sites.cache_path, PathBuf::from("data/sites_cache.json"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
telegram:
  token-env: MY_BOT_TOKEN
  update-timeout-ms: 5000
planner:
  base-url: http://localhost:8080/v2
  timeout-ms: 4000
  location-source: site-list
sites:
  cache-path: /tmp/sites.json
  dry-run: true
  search-limit: 8
defaults:
  home: "9091001000009182"
  work: Slussen
display:
  timezone: Europe/Oslo
  journey-count: 2
storage:
  prefs-path: /tmp/prefs.json
log-level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.telegram.token_env, "MY_BOT_TOKEN");
        assert_eq!(config.telegram.update_timeout_ms, 5000);
        assert_eq!(config.telegram.base_url, "https://api.telegram.org");
        assert_eq!(config.planner.base_url, "http://localhost:8080/v2");
        assert_eq!(config.planner.timeout_ms, 4000);
        assert_eq!(config.planner.location_source, LocationSource::SiteList);
        assert_eq!(config.sites.cache_path, PathBuf::from("/tmp/sites.json"));
        assert_eq!(config.sites.base_url, "https://transport.integration.sl.se/v1");
        assert!(config.planner.dry_run);
        assert_eq!(config.planner.search_limit, 8);
        assert_eq!(config.defaults.home.as_deref(), Some("9091001000009182"));
        assert_eq!(config.defaults.work.as_deref(), Some("Slussen"));
        assert_eq!(config.display.timezone().unwrap(), chrono_tz::Europe::Oslo);
        assert_eq!(config.display.journey_count, 2);
        assert_eq!(config.storage.prefs_path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "planner:\n  timeout-ms: 2500\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.planner.timeout_ms, 2500);
        assert_eq!(config.planner.search_limit, 5);
        assert_eq!(config.display.timezone, "Europe/Stockholm");
        assert!(config.defaults.home.is_none());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let display = DisplayConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(display.timezone().is_err());
    }

    #[test]
    fn test_validate_requires_planner_timeout_below_update_timeout() {
        let mut config = Config::default();
        config.telegram.update_timeout_ms = 5000;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("planner.timeout-ms (10000)"), "{}", err);

        config.planner.timeout_ms = 5000;
        assert!(config.validate().unwrap_err().to_string().contains("must be lower"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/transitbot.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("transitbot.yml");
        std::fs::write(&path, "log-level: warn\ndisplay:\n  journey-count: 1\n").unwrap();

        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.display.journey_count, 1);
    }
}
