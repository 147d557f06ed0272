//! Pending selection messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::Role;
use crate::planner::Candidate;
use prefstore::UserId;

/// Errors from pending selection operations
#[derive(Debug, Error)]
pub enum PendingError {
    #[error("Channel error")]
    ChannelError,
}

/// Response from pending selection operations
pub type PendingResponse<T> = Result<T, PendingError>;

/// Commands sent to the PendingSelections actor
#[derive(Debug)]
pub enum PendingCommand {
    /// Replace any list stored for (user, role)
    Put {
        user: UserId,
        role: Role,
        candidates: Vec<Candidate>,
        reply: oneshot::Sender<()>,
    },
    /// Read the list without removing it
    Get {
        user: UserId,
        role: Role,
        reply: oneshot::Sender<Option<Vec<Candidate>>>,
    },
    /// Remove and return the list
    Take {
        user: UserId,
        role: Role,
        reply: oneshot::Sender<Option<Vec<Candidate>>>,
    },
    /// Number of outstanding lists
    Count { reply: oneshot::Sender<usize> },

    // Shutdown
    Shutdown,
}
