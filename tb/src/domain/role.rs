//! Saved-location role

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the user's two saved locations a selection applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Home,
    Work,
}

impl Role {
    /// Token prefix used in callback data
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Home => "home",
            Role::Work => "work",
        }
    }

    /// Capitalised name for confirmation messages
    pub fn title(&self) -> &'static str {
        match self {
            Role::Home => "Home",
            Role::Work => "Work",
        }
    }

    /// The `/set...` command that configures this role
    pub fn command(&self) -> &'static str {
        match self {
            Role::Home => "/sethome",
            Role::Work => "/setwork",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    // "homejp"/"workjp" are accepted so prompts sent by earlier deployments still resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" | "homejp" => Ok(Role::Home),
            "work" | "workjp" => Ok(Role::Work),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}
