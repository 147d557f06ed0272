//! Addressing tokens carried by prompt options
//!
//! Three underscore-separated fields: `<role>_<user>_<index>` for location
//! choices and `priority_<user>_<value>` for route priority choices.

use std::fmt;
use std::str::FromStr;

use prefstore::{RoutePriority, UserId};
use thiserror::Error;

use crate::domain::Role;

const PRIORITY_ACTION: &str = "priority";

/// Why a token could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unknown token action: {0}")]
    UnknownAction(String),

    #[error("Invalid user id in token: {0}")]
    InvalidUser(String),

    #[error("Invalid index in token: {0}")]
    InvalidIndex(String),

    #[error("Unknown route priority in token: {0}")]
    UnknownPriority(String),
}

/// A decoded click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    /// Pick the candidate at `index` of the list pending for (user, role)
    Location { role: Role, user: UserId, index: usize },
    Priority { user: UserId, priority: RoutePriority },
}

impl CallbackToken {
    /// User the prompt was issued to
    pub fn user(&self) -> UserId {
        match self {
            CallbackToken::Location { user, .. } | CallbackToken::Priority { user, .. } => *user,
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackToken::Location { role, user, index } => write!(f, "{}_{}_{}", role.as_str(), user, index),
            CallbackToken::Priority { user, priority } => {
                write!(f, "{}_{}_{}", PRIORITY_ACTION, user, priority.as_str())
            }
        }
    }
}

impl FromStr for CallbackToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('_').collect();
        let [action, user, last] = parts.as_slice() else {
            return Err(TokenError::Malformed(s.to_string()));
        };

        let user: UserId = user.parse().map_err(|_| TokenError::InvalidUser(user.to_string()))?;

        if *action == PRIORITY_ACTION {
            let priority = last
                .parse::<RoutePriority>()
                .map_err(|_| TokenError::UnknownPriority(last.to_string()))?;
            return Ok(CallbackToken::Priority { user, priority });
        }

        let role: Role = action.parse().map_err(|_| TokenError::UnknownAction(action.to_string()))?;
        let index: usize = last.parse().map_err(|_| TokenError::InvalidIndex(last.to_string()))?;
        Ok(CallbackToken::Location { role, user, index })
    }
}
