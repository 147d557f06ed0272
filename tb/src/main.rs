//! TransitBot - chat bot entry point

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use prefstore::{PrefStore, RoutePriority};
use transitbot::cli::{Cli, Command};
use transitbot::config::{Config, LocationSource};
use transitbot::itinerary::format_departures;
use transitbot::planner::{load_site_index, save_cache};
use transitbot::{
    Candidate, CandidateResolver, Handler, ItineraryFormatter, JourneyPlannerClient, LocationSearch, PendingSelections,
    Runner, SelectionMachine, SiteIndex, SiteList, TelegramClient, TransportApiClient, TripSearch,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize logging: {}", e))?;

    debug!(?level, "setup_logging: initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Run) => cmd_run(&config).await,
        Some(Command::Search { query, limit, sites }) => cmd_search(&config, &query, limit, sites.as_deref()).await,
        Some(Command::Trips {
            from,
            to,
            count,
            priority,
        }) => cmd_trips(&config, &from, &to, count, priority.as_deref()).await,
        Some(Command::Sites) => cmd_sites(&config).await,
        Some(Command::Departures { site_id, count }) => cmd_departures(&config, site_id, count).await,
        Some(Command::Config) => cmd_config(&config),
    }
}

async fn cmd_run(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let tz = config.display.timezone()?;

    let planner = Arc::new(JourneyPlannerClient::from_config(&config.planner)?);
    if planner.is_dry_run() {
        warn!("Dry-run mode: serving built-in fixtures instead of calling the journey planner");
    }
    let prefs = Arc::new(PrefStore::open(&config.storage.prefs_path).context("Failed to open preference store")?);
    let telegram = Arc::new(TelegramClient::from_config(&config.telegram)?);

    let search: Arc<dyn LocationSearch> = match config.planner.location_source {
        LocationSource::StopFinder => planner.clone(),
        LocationSource::SiteList => {
            let client = TransportApiClient::from_config(&config.sites, config.planner.dry_run)?;
            let index = load_site_index(&client, &config.sites.cache_path).await;
            info!(count = index.len(), "Location queries use the SL site list");
            Arc::new(index)
        }
    };

    let pending = PendingSelections::spawn();
    let lookup_deadline = Duration::from_millis(config.planner.timeout_ms);
    let resolver = CandidateResolver::new(search, config.planner.search_limit).with_deadline(lookup_deadline);
    let machine = SelectionMachine::new(resolver, pending.clone(), prefs);
    let handler = Arc::new(
        Handler::new(
            machine,
            planner,
            telegram.clone(),
            ItineraryFormatter::new(tz),
            config.defaults.clone(),
            config.display.journey_count,
        )
        .with_trip_deadline(lookup_deadline),
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let runner = Runner::new(
        telegram,
        handler,
        pending,
        Duration::from_millis(config.telegram.update_timeout_ms),
    );
    let runner_handle = tokio::spawn(runner.run(shutdown_rx));

    info!("Bot running. Press Ctrl+C to stop.");
    wait_for_shutdown().await?;
    let _ = shutdown_tx.send(()).await;

    runner_handle.await.context("Runner task panicked")??;
    info!("Bot stopped");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        warn!("Ctrl+C received");
    }

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, limit: usize, sites: Option<&Path>) -> Result<()> {
    let search: Box<dyn LocationSearch> = match sites {
        Some(path) => {
            let content = fs::read_to_string(path).context(format!("Failed to read sites file: {}", path.display()))?;
            let sites: Vec<Candidate> =
                serde_json::from_str(&content).context(format!("Failed to parse sites file: {}", path.display()))?;
            info!(count = sites.len(), path = %path.display(), "Loaded site list");
            Box::new(SiteIndex::new(sites))
        }
        None => Box::new(JourneyPlannerClient::from_config(&config.planner)?),
    };
    let candidates = search.search(query, limit).await.context("Location search failed")?;

    if candidates.is_empty() {
        println!("No locations found matching '{}'", query);
        return Ok(());
    }
    for (i, c) in candidates.iter().enumerate() {
        println!("{:>2}. {} {} {}", i, c.name.cyan(), format!("({})", c.kind).dimmed(), c.id.yellow());
    }
    Ok(())
}

async fn cmd_trips(config: &Config, from: &str, to: &str, count: Option<usize>, priority: Option<&str>) -> Result<()> {
    let client = JourneyPlannerClient::from_config(&config.planner)?;
    let formatter = ItineraryFormatter::new(config.display.timezone()?);
    let priority = priority.map(str::parse::<RoutePriority>).transpose()?;
    let count = count.unwrap_or(config.display.journey_count);

    let journeys = client
        .trips(from, to, count, priority)
        .await
        .context("Trip search failed")?;
    println!("{}", formatter.format_journeys(&journeys, count));
    Ok(())
}

async fn cmd_sites(config: &Config) -> Result<()> {
    let client = TransportApiClient::from_config(&config.sites, config.planner.dry_run)?;
    let sites = client.sites().await.context("Failed to fetch site list")?;
    save_cache(&config.sites.cache_path, &sites)?;
    println!(
        "Wrote {} sites to {}",
        sites.len().to_string().cyan(),
        config.sites.cache_path.display()
    );
    Ok(())
}

async fn cmd_departures(config: &Config, site_id: i64, count: usize) -> Result<()> {
    let client = TransportApiClient::from_config(&config.sites, config.planner.dry_run)?;
    let tz = config.display.timezone()?;
    let departures = client
        .departures(site_id)
        .await
        .context(format!("Failed to fetch departures for site {}", site_id))?;

    if departures.is_empty() {
        println!("No departures from site {}", site_id);
        return Ok(());
    }
    println!("{}", format_departures(&departures, count, tz));
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
