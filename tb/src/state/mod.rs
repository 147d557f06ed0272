//! Pending selection state with actor pattern
//!
//! PendingSelections owns the map of outstanding candidate lists and processes
//! messages via channels, so every operation (including take-and-clear) is
//! applied atomically with respect to all others.

mod manager;
mod messages;

pub use manager::{PendingKey, PendingSelections};
pub use messages::{PendingCommand, PendingError, PendingResponse};
