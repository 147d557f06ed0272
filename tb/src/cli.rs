//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TransitBot - saved-location transit itineraries over chat
#[derive(Debug, Parser)]
#[command(
    name = "tb",
    about = "Transit chat bot: saved locations, realtime itineraries",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bot and poll for updates
    Run,

    /// Look up location candidates
    Search {
        /// Free-text query
        query: String,

        /// Maximum candidates (0 for all the backend returns)
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,

        /// Search a local JSON list of sites instead of the journey planner
        #[arg(long, value_name = "FILE")]
        sites: Option<PathBuf>,
    },

    /// Print an itinerary between two location references
    Trips {
        /// Origin reference
        from: String,

        /// Destination reference
        to: String,

        /// Number of options (1-3; defaults to the configured count)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Route priority (leasttime, leastinterchange, leastwalking)
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Fetch the SL site list and refresh the site cache
    Sites,

    /// Print upcoming departures from an SL site
    Departures {
        /// Site ID from the site list
        site_id: i64,

        /// Number of departures to show
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["tb"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_trips_args() {
        let cli = Cli::try_parse_from(["tb", "-l", "debug", "trips", "Odenplan", "Slussen", "-n", "2", "-p", "leastwalking"])
            .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Trips {
                from,
                to,
                count,
                priority,
            }) => {
                assert_eq!(from, "Odenplan");
                assert_eq!(to, "Slussen");
                assert_eq!(count, Some(2));
                assert_eq!(priority.as_deref(), Some("leastwalking"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_default_limit() {
        let cli = Cli::try_parse_from(["tb", "search", "Odenplan"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Search { limit: 5, .. })));
    }

    #[test]
    fn test_departures_args() {
        let cli = Cli::try_parse_from(["tb", "departures", "3484"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Departures { site_id: 3484, count: 3 })));
        assert!(Cli::try_parse_from(["tb", "departures", "Storgatan"]).is_err());
    }
}
