use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use prefstore::cli::{Cli, Command};
use prefstore::config::Config;
use prefstore::{PrefStore, RoutePriority, UserPreferences};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn describe(value: &str) -> ColoredString {
    if value.is_empty() { "(not set)".dimmed() } else { value.cyan() }
}

fn print_prefs(user: i64, prefs: &UserPreferences) {
    println!("User: {}", user.to_string().yellow());
    println!("  Home: {}", describe(&prefs.home_location));
    println!("  Work: {}", describe(&prefs.work_location));
    match prefs.route_priority {
        Some(p) => println!("  Route priority: {} ({})", p.label().cyan(), p),
        None => println!("  Route priority: {}", "(not set)".dimmed()),
    }
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.unwrap_or(config.store_path);

    info!("prefstore starting");

    let store = PrefStore::open(&store_path)?;

    match cli.command {
        Command::List => {
            let all = store.list();
            if all.is_empty() {
                println!("No preferences saved");
            } else {
                for (user, prefs) in all {
                    print_prefs(user, &prefs);
                }
            }
        }
        Command::Show { user } => {
            print_prefs(user, &store.get(user));
        }
        Command::SetHome { user, location } => {
            store.set_home(user, &location)?;
            println!("{} Home for {} set to: {}", "✓".green(), user, location.cyan());
        }
        Command::SetWork { user, location } => {
            store.set_work(user, &location)?;
            println!("{} Work for {} set to: {}", "✓".green(), user, location.cyan());
        }
        Command::SetPriority { user, priority } => {
            let priority: RoutePriority = priority.parse()?;
            store.set_priority(user, priority)?;
            println!("{} Route priority for {} set to: {}", "✓".green(), user, priority.label().cyan());
        }
    }

    Ok(())
}
