//! Selection state machine
//!
//! Per (user, role): `NoSelectionPending` until a query yields two or more
//! candidates, then `PromptIssued` until a click resolves it. A click takes
//! the pending list out of the store before anything else, so at most one
//! click per prompt can ever persist.

use std::sync::Arc;

use prefstore::{RoutePriority, UserId};
use tracing::{debug, info, warn};

use super::CallbackToken;
use crate::chat::PromptOption;
use crate::domain::Role;
use crate::planner::Candidate;
use crate::prefs::PreferenceStore;
use crate::resolver::{CandidateResolver, Resolution};
use crate::state::PendingSelections;

pub const LOOKUP_FAILED: &str = "❌ Error searching locations. Try again later.";
pub const SAVE_FAILED: &str = "❌ Error saving preference. Try again later.";
pub const SELECTION_INVALID: &str = "❌ Selection no longer available.";
pub const UNAVAILABLE: &str = "❌ Something went wrong. Try again later.";

/// Observable state for one (user, role)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoSelectionPending,
    /// A prompt is outstanding with this many options
    PromptIssued(usize),
}

/// An interactive choice to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub options: Vec<PromptOption>,
}

/// Result of a `/sethome` or `/setwork` query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Empty query
    Usage(Role),
    NoMatches(String),
    LookupFailed,
    /// Exactly one match, saved without prompting
    Saved { role: Role, candidate: Candidate },
    SaveFailed,
    Prompt(Prompt),
    /// Pending store unreachable
    Unavailable,
}

impl QueryOutcome {
    /// Reply text; for prompts, the prompt's own text
    pub fn message(&self) -> String {
        match self {
            QueryOutcome::Usage(role) => usage(*role),
            QueryOutcome::NoMatches(query) => format!("❌ No locations found matching '{}'", query),
            QueryOutcome::LookupFailed => LOOKUP_FAILED.to_string(),
            QueryOutcome::Saved { role, candidate } => confirmation(*role, &candidate.name),
            QueryOutcome::SaveFailed => SAVE_FAILED.to_string(),
            QueryOutcome::Prompt(prompt) => prompt.text.clone(),
            QueryOutcome::Unavailable => UNAVAILABLE.to_string(),
        }
    }
}

/// Result of a click on a prompt option
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    LocationSaved { role: Role, candidate: Candidate },
    PrioritySaved(RoutePriority),
    /// Malformed token, foreign user, stale or duplicate click, bad index
    Invalid,
    /// The pending list was consumed but the write failed; it is not restored
    SaveFailed,
}

impl ClickOutcome {
    pub fn message(&self) -> String {
        match self {
            ClickOutcome::LocationSaved { role, candidate } => confirmation(*role, &candidate.name),
            ClickOutcome::PrioritySaved(priority) => format!("✅ Route priority set to: {}", priority.label()),
            ClickOutcome::Invalid => SELECTION_INVALID.to_string(),
            ClickOutcome::SaveFailed => SAVE_FAILED.to_string(),
        }
    }

    /// Success replaces the prompt; failures are sent as a new message
    pub fn edits_prompt(&self) -> bool {
        matches!(self, ClickOutcome::LocationSaved { .. } | ClickOutcome::PrioritySaved(_))
    }
}

fn confirmation(role: Role, name: &str) -> String {
    format!("✅ {} set to: {}", role.title(), name)
}

fn usage(role: Role) -> String {
    let (stop, address) = match role {
        Role::Home => ("Odenplan", "Drottninggatan 1, Stockholm"),
        Role::Work => ("Slussen", "Kungsgatan 10, Stockholm"),
    };
    let cmd = role.command();
    format!(
        "❓ Usage: {} <location>\n\nExamples:\n• {} {}\n• {} {}",
        cmd, cmd, stop, cmd, address
    )
}

/// The route priority prompt: one option per priority
pub fn priority_prompt(user: UserId) -> Prompt {
    let options = RoutePriority::ALL
        .iter()
        .map(|&priority| {
            let icon = match priority {
                RoutePriority::Fastest => "⚡",
                RoutePriority::LeastTransfers => "🔄",
                RoutePriority::LeastWalking => "🚶",
            };
            PromptOption::new(
                format!("{} {}", icon, priority.label()),
                CallbackToken::Priority { user, priority }.encode(),
            )
        })
        .collect();
    Prompt {
        text: "Choose your route priority:".to_string(),
        options,
    }
}

/// Drives query resolution and click handling for saved locations
#[derive(Clone)]
pub struct SelectionMachine {
    resolver: CandidateResolver,
    pending: PendingSelections,
    prefs: Arc<dyn PreferenceStore>,
}

impl SelectionMachine {
    pub fn new(resolver: CandidateResolver, pending: PendingSelections, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self {
            resolver,
            pending,
            prefs,
        }
    }

    pub fn resolver(&self) -> &CandidateResolver {
        &self.resolver
    }

    pub fn prefs(&self) -> &Arc<dyn PreferenceStore> {
        &self.prefs
    }

    /// Whether a prompt is outstanding for (user, role)
    pub async fn state(&self, user: UserId, role: Role) -> SelectionState {
        match self.pending.get(user, role).await {
            Ok(Some(list)) => SelectionState::PromptIssued(list.len()),
            Ok(None) => SelectionState::NoSelectionPending,
            Err(e) => {
                warn!(user, %role, error = %e, "state: pending store unavailable");
                SelectionState::NoSelectionPending
            }
        }
    }

    /// Handle a `/sethome` or `/setwork` query
    pub async fn start(&self, user: UserId, role: Role, query: &str) -> QueryOutcome {
        debug!(user, %role, %query, "start: called");
        let resolution = match self.resolver.resolve(query).await {
            Ok(r) => r,
            Err(e) => {
                warn!(user, %role, error = %e, "start: lookup failed");
                return QueryOutcome::LookupFailed;
            }
        };

        match resolution {
            Resolution::InvalidQuery => QueryOutcome::Usage(role),
            Resolution::NoMatches => QueryOutcome::NoMatches(query.trim().to_string()),
            Resolution::Single(candidate) => {
                self.persist(user, role, candidate, QueryOutcome::SaveFailed, |role, candidate| {
                    QueryOutcome::Saved { role, candidate }
                })
                .await
            }
            Resolution::Multiple(candidates) => {
                let options: Vec<PromptOption> = candidates
                    .iter()
                    .enumerate()
                    .map(|(index, c)| {
                        PromptOption::new(c.label(), CallbackToken::Location { role, user, index }.encode())
                    })
                    .collect();

                if let Err(e) = self.pending.put(user, role, candidates).await {
                    warn!(user, %role, error = %e, "start: failed to record pending selection");
                    return QueryOutcome::Unavailable;
                }
                debug!(user, %role, options = options.len(), "start: prompt issued");
                QueryOutcome::Prompt(Prompt {
                    text: format!("Multiple matches for '{}'. Which one?", query.trim()),
                    options,
                })
            }
        }
    }

    /// Handle a click by `clicker` carrying `data`
    pub async fn resolve(&self, clicker: UserId, data: &str) -> ClickOutcome {
        debug!(clicker, %data, "resolve: called");
        let token = match data.parse::<CallbackToken>() {
            Ok(t) => t,
            Err(e) => {
                warn!(clicker, %data, error = %e, "resolve: undecodable token");
                return ClickOutcome::Invalid;
            }
        };

        if token.user() != clicker {
            warn!(clicker, owner = token.user(), "resolve: token belongs to another user");
            return ClickOutcome::Invalid;
        }

        match token {
            CallbackToken::Priority { user, priority } => {
                match self.write(move |p| p.set_priority(user, priority)).await {
                    Ok(()) => {
                        info!(user, %priority, "resolve: route priority saved");
                        ClickOutcome::PrioritySaved(priority)
                    }
                    Err(e) => {
                        warn!(user, error = %e, "resolve: failed to save priority");
                        ClickOutcome::SaveFailed
                    }
                }
            }
            CallbackToken::Location { role, user, index } => {
                let taken = match self.pending.take_and_clear(user, role).await {
                    Ok(taken) => taken,
                    Err(e) => {
                        warn!(user, %role, error = %e, "resolve: pending store unavailable");
                        return ClickOutcome::Invalid;
                    }
                };
                let Some(mut candidates) = taken else {
                    debug!(user, %role, "resolve: nothing pending");
                    return ClickOutcome::Invalid;
                };
                if index >= candidates.len() {
                    debug!(user, %role, index, len = candidates.len(), "resolve: index out of range");
                    return ClickOutcome::Invalid;
                }
                let candidate = candidates.swap_remove(index);
                self.persist(user, role, candidate, ClickOutcome::SaveFailed, |role, candidate| {
                    ClickOutcome::LocationSaved { role, candidate }
                })
                .await
            }
        }
    }

    async fn persist<T>(
        &self,
        user: UserId,
        role: Role,
        candidate: Candidate,
        failed: T,
        saved: impl FnOnce(Role, Candidate) -> T,
    ) -> T {
        let id = candidate.id.clone();
        match self.write(move |p| p.set_location(user, role, &id)).await {
            Ok(()) => {
                info!(user, %role, id = %candidate.id, name = %candidate.name, "persist: location saved");
                saved(role, candidate)
            }
            Err(e) => {
                warn!(user, %role, error = %e, "persist: failed to save location");
                failed
            }
        }
    }

    /// Run a preference write on the blocking pool; file writes end in `sync_all`
    async fn write<F>(&self, write: F) -> eyre::Result<()>
    where
        F: FnOnce(&dyn PreferenceStore) -> eyre::Result<()> + Send + 'static,
    {
        let prefs = Arc::clone(&self.prefs);
        tokio::task::spawn_blocking(move || write(prefs.as_ref()))
            .await
            .map_err(|e| eyre::eyre!("Preference write task failed: {}", e))?
    }
}
