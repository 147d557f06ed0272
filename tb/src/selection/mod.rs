//! Selection resolution
//!
//! Turns a free-text query into one saved location, either immediately (one
//! match) or through a prompt whose click is resolved later against the
//! pending-selection store.

mod machine;
mod token;

pub use machine::{
    ClickOutcome, LOOKUP_FAILED, Prompt, QueryOutcome, SAVE_FAILED, SELECTION_INVALID, SelectionMachine, SelectionState,
    UNAVAILABLE, priority_prompt,
};
pub use token::{CallbackToken, TokenError};
