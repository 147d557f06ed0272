//! CLI argument parsing for prefstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prefs")]
#[command(author, version, about = "Inspect and edit saved transit preferences", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the preferences file (overrides config)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all users with saved preferences
    List,

    /// Show one user's preferences
    Show {
        /// User ID
        #[arg(required = true)]
        user: i64,
    },

    /// Set a user's home location
    SetHome {
        /// User ID
        #[arg(required = true)]
        user: i64,

        /// Location reference (stop ID, address or coordinates)
        #[arg(required = true)]
        location: String,
    },

    /// Set a user's work location
    SetWork {
        /// User ID
        #[arg(required = true)]
        user: i64,

        /// Location reference (stop ID, address or coordinates)
        #[arg(required = true)]
        location: String,
    },

    /// Set a user's route priority (leasttime, leastinterchange, leastwalking)
    SetPriority {
        /// User ID
        #[arg(required = true)]
        user: i64,

        /// Route priority value
        #[arg(required = true)]
        priority: String,
    },
}
