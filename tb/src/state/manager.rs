//! PendingSelections - actor that owns the outstanding candidate lists
//!
//! Processes commands via channels for serialized access. No command does any
//! I/O, so each one completes immediately once it reaches the actor.

use std::collections::HashMap;

use prefstore::UserId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{PendingCommand, PendingError, PendingResponse};
use crate::domain::Role;
use crate::planner::Candidate;

/// At most one list exists per key; a newer prompt replaces the older one
pub type PendingKey = (UserId, Role);

/// Handle to send commands to the PendingSelections actor
#[derive(Clone)]
pub struct PendingSelections {
    tx: mpsc::Sender<PendingCommand>,
}

impl PendingSelections {
    /// Spawn a new PendingSelections actor on the current runtime
    pub fn spawn() -> Self {
        debug!("spawn: called");
        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(actor_loop(rx));

        info!("PendingSelections spawned");
        Self { tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> PendingCommand) -> PendingResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| PendingError::ChannelError)?;
        reply_rx.await.map_err(|_| PendingError::ChannelError)
    }

    /// Store `candidates` for (user, role), replacing any previous list
    pub async fn put(&self, user: UserId, role: Role, candidates: Vec<Candidate>) -> PendingResponse<()> {
        debug!(user, %role, count = candidates.len(), "put: called");
        self.request(|reply| PendingCommand::Put {
            user,
            role,
            candidates,
            reply,
        })
        .await
    }

    /// The current list for (user, role), left in place
    pub async fn get(&self, user: UserId, role: Role) -> PendingResponse<Option<Vec<Candidate>>> {
        debug!(user, %role, "get: called");
        self.request(|reply| PendingCommand::Get { user, role, reply }).await
    }

    /// Remove and return the list for (user, role)
    ///
    /// Of any number of concurrent callers, exactly one receives the list.
    pub async fn take_and_clear(&self, user: UserId, role: Role) -> PendingResponse<Option<Vec<Candidate>>> {
        debug!(user, %role, "take_and_clear: called");
        self.request(|reply| PendingCommand::Take { user, role, reply }).await
    }

    /// Number of outstanding lists across all users
    pub async fn count(&self) -> PendingResponse<usize> {
        self.request(|reply| PendingCommand::Count { reply }).await
    }

    /// Stop the actor; later calls fail with [`PendingError::ChannelError`]
    pub async fn shutdown(&self) -> PendingResponse<()> {
        debug!("shutdown: called");
        self.tx
            .send(PendingCommand::Shutdown)
            .await
            .map_err(|_| PendingError::ChannelError)
    }
}

async fn actor_loop(mut rx: mpsc::Receiver<PendingCommand>) {
    debug!("PendingSelections actor started");
    let mut pending: HashMap<PendingKey, Vec<Candidate>> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            PendingCommand::Put {
                user,
                role,
                candidates,
                reply,
            } => {
                let replaced = pending.insert((user, role), candidates).is_some();
                debug!(user, %role, replaced, "actor_loop: Put command");
                let _ = reply.send(());
            }

            PendingCommand::Get { user, role, reply } => {
                debug!(user, %role, "actor_loop: Get command");
                let _ = reply.send(pending.get(&(user, role)).cloned());
            }

            PendingCommand::Take { user, role, reply } => {
                let taken = pending.remove(&(user, role));
                debug!(user, %role, found = taken.is_some(), "actor_loop: Take command");
                let _ = reply.send(taken);
            }

            PendingCommand::Count { reply } => {
                let _ = reply.send(pending.len());
            }

            PendingCommand::Shutdown => {
                info!(outstanding = pending.len(), "PendingSelections shutting down");
                break;
            }
        }
    }

    debug!("PendingSelections actor stopped");
}
