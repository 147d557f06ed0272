//! Preference persistence seam used by the bot core

use eyre::Result;
use prefstore::{PrefStore, RoutePriority, UserId, UserPreferences};

use crate::domain::Role;

/// Durable per-user preferences
///
/// Writes must be durable before they return `Ok`.
pub trait PreferenceStore: Send + Sync {
    /// Saved preferences, or the empty default for unknown users
    fn preferences(&self, user: UserId) -> UserPreferences;

    fn set_home(&self, user: UserId, location: &str) -> Result<()>;

    fn set_work(&self, user: UserId, location: &str) -> Result<()>;

    fn set_priority(&self, user: UserId, priority: RoutePriority) -> Result<()>;

    /// Save `location` in the field named by `role`
    fn set_location(&self, user: UserId, role: Role, location: &str) -> Result<()> {
        match role {
            Role::Home => self.set_home(user, location),
            Role::Work => self.set_work(user, location),
        }
    }
}

impl PreferenceStore for PrefStore {
    fn preferences(&self, user: UserId) -> UserPreferences {
        self.get(user)
    }

    fn set_home(&self, user: UserId, location: &str) -> Result<()> {
        PrefStore::set_home(self, user, location)
    }

    fn set_work(&self, user: UserId, location: &str) -> Result<()> {
        PrefStore::set_work(self, user, location)
    }

    fn set_priority(&self, user: UserId, priority: RoutePriority) -> Result<()> {
        PrefStore::set_priority(self, user, priority)
    }
}
