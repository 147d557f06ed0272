//! Domain types shared across the bot
//!
//! - [`Role`] - which saved location (home/work) an action applies to
//! - [`TransportMode`] - closed classification of a trip leg's vehicle

mod mode;
mod role;

pub use mode::TransportMode;
pub use role::Role;
