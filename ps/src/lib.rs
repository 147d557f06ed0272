//! PrefStore - durable per-user transit preferences
//!
//! Keeps each user's saved home and work locations and their route priority
//! in memory and mirrors every change to a single JSON file.
//!
//! # File format
//!
//! ```text
//! {
//!   "123456": {
//!     "homeLocation": "9091001000009182",
//!     "workLocation": "9091001000009117",
//!     "routePriority": "leastwalking"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use prefstore::{PrefStore, RoutePriority};
//!
//! let store = PrefStore::open("data/userprefs.json")?;
//! store.set_home(42, "9091001000009182")?;
//! store.set_priority(42, RoutePriority::LeastWalking)?;
//! assert_eq!(store.get(42).home_location, "9091001000009182");
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{PrefStore, RoutePriority, UserId, UserPreferences};

/// Default location of the preferences file, relative to the working directory
pub const DEFAULT_PREFS_PATH: &str = "data/userprefs.json";
