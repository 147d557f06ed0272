//! Long-poll update loop
//!
//! Fetches updates in batches and handles each on its own task under a
//! deadline, so a slow backend for one user never holds up another.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::chat::{TelegramClient, TransportError, Update};
use crate::handler::Handler;
use crate::state::PendingSelections;

/// Pause before polling again after a failed poll
const RETRY_PAUSE: Duration = Duration::from_secs(3);

/// How long in-flight updates may run after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Where updates come from
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with id >= `offset`, waiting for new ones if there are none
    async fn poll(&self, offset: i64) -> Result<Vec<Update>, TransportError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.get_updates(offset).await
    }
}

pub struct Runner {
    source: Arc<dyn UpdateSource>,
    handler: Arc<Handler>,
    pending: PendingSelections,
    update_timeout: Duration,
}

impl Runner {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        handler: Arc<Handler>,
        pending: PendingSelections,
        update_timeout: Duration,
    ) -> Self {
        Self {
            source,
            handler,
            pending,
            update_timeout,
        }
    }

    /// Poll and dispatch until a shutdown message arrives (or its sender drops)
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) -> eyre::Result<()> {
        info!(update_timeout_ms = self.update_timeout.as_millis() as u64, "Runner: polling for updates");
        let mut offset = 0i64;
        let mut tasks = JoinSet::new();

        loop {
            while tasks.try_join_next().is_some() {}

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("run: shutdown signal received");
                    info!("Shutdown signal received");
                    break;
                }
                polled = self.source.poll(offset) => match polled {
                    Ok(updates) => {
                        debug!(count = updates.len(), offset, "run: updates received");
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let handler = self.handler.clone();
                            let deadline = self.update_timeout;
                            tasks.spawn(dispatch(handler, update, deadline));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "run: polling failed, retrying");
                        tokio::select! {
                            _ = shutdown_rx.recv() => {
                                info!("Shutdown signal received");
                                break;
                            }
                            _ = tokio::time::sleep(RETRY_PAUSE) => {}
                        }
                    }
                }
            }
        }

        debug!(in_flight = tasks.len(), "run: draining in-flight updates");
        if tokio::time::timeout(DRAIN_TIMEOUT, async { while tasks.join_next().await.is_some() {} })
            .await
            .is_err()
        {
            warn!(remaining = tasks.len(), "run: drain timed out, aborting");
            tasks.abort_all();
        }

        if let Err(e) = self.pending.shutdown().await {
            debug!(error = %e, "run: pending store already stopped");
        }
        info!("Runner stopped");
        Ok(())
    }
}

async fn dispatch(handler: Arc<Handler>, update: Update, deadline: Duration) {
    let update_id = update.update_id;
    match tokio::time::timeout(deadline, handler.handle_update(update)).await {
        Ok(Ok(())) => debug!(update_id, "dispatch: handled"),
        Ok(Err(e)) => warn!(update_id, error = %e, "dispatch: reply failed"),
        Err(_) => warn!(update_id, deadline_ms = deadline.as_millis() as u64, "dispatch: deadline exceeded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::mock::{MockTransport, Sent};
    use crate::chat::{Chat, Message, User};
    use crate::config::DefaultsConfig;
    use crate::itinerary::ItineraryFormatter;
    use crate::planner::mock::MockPlanner;
    use crate::prefs::mock::MemoryPrefs;
    use crate::resolver::CandidateResolver;
    use crate::selection::SelectionMachine;
    use std::sync::Mutex;

    /// Serves queued batches, then waits forever
    struct QueuedSource {
        batches: Mutex<Vec<Vec<Update>>>,
        offsets: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl UpdateSource for QueuedSource {
        async fn poll(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
            self.offsets.lock().unwrap().push(offset);
            let next = self.batches.lock().unwrap().pop();
            match next {
                Some(batch) => Ok(batch),
                None => std::future::pending().await,
            }
        }
    }

    /// Fails every poll
    struct BrokenSource;

    #[async_trait]
    impl UpdateSource for BrokenSource {
        async fn poll(&self, _offset: i64) -> Result<Vec<Update>, TransportError> {
            Err(TransportError::Api {
                code: 502,
                description: "Bad Gateway".to_string(),
            })
        }
    }

    fn handler(planner: Arc<MockPlanner>, transport: Arc<MockTransport>, pending: PendingSelections) -> Arc<Handler> {
        let machine = SelectionMachine::new(
            CandidateResolver::new(planner.clone(), 5).with_deadline(Duration::from_millis(50)),
            pending,
            Arc::new(MemoryPrefs::new()),
        );
        Arc::new(Handler::new(
            machine,
            planner,
            transport,
            ItineraryFormatter::new(chrono_tz::UTC),
            DefaultsConfig::default(),
            3,
        ))
    }

    fn text_update(id: i64, text: &str) -> Update {
        Update {
            update_id: id,
            message: Some(Message {
                message_id: id,
                chat: Chat { id: 9 },
                from: Some(User { id: 9, username: None }),
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    #[tokio::test]
    async fn test_runner_dispatches_and_stops() {
        let planner = Arc::new(MockPlanner::new(vec![]));
        let transport = Arc::new(MockTransport::new());
        let pending = PendingSelections::spawn();
        let handler = handler(planner, transport.clone(), pending.clone());
        let source = Arc::new(QueuedSource {
            batches: Mutex::new(vec![vec![text_update(7, "/help"), text_update(8, "nonsense")]]),
            offsets: Mutex::new(vec![]),
        });

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let runner = Runner::new(source.clone(), handler, pending.clone(), Duration::from_secs(5));
        let task = tokio::spawn(runner.run(shutdown_rx));

        for _ in 0..100 {
            if transport.sent().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown_tx.send(()).await.unwrap();
        task.await.unwrap().unwrap();

        let texts: Vec<_> = transport
            .sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&crate::handler::UNKNOWN_COMMAND.to_string()));
        assert_eq!(source.offsets.lock().unwrap().as_slice(), &[0, 9]);
        assert!(pending.count().await.is_err());
    }

    #[tokio::test]
    async fn test_slow_lookup_still_gets_a_reply() {
        let planner = Arc::new(MockPlanner::new(vec![]).with_delay(Duration::from_secs(5)));
        let transport = Arc::new(MockTransport::new());
        let handler = handler(planner, transport.clone(), PendingSelections::spawn());

        dispatch(handler, text_update(1, "/sethome Odenplan"), Duration::from_secs(1)).await;
        assert_eq!(transport.last_text().as_deref(), Some(crate::selection::LOOKUP_FAILED));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_retry_pause() {
        let planner = Arc::new(MockPlanner::new(vec![]));
        let transport = Arc::new(MockTransport::new());
        let pending = PendingSelections::spawn();
        let handler = handler(planner, transport, pending.clone());

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let runner = Runner::new(Arc::new(BrokenSource), handler, pending, Duration::from_secs(5));
        let task = tokio::spawn(runner.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let started = std::time::Instant::now();
        shutdown_tx.send(()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runner kept sleeping after shutdown")
            .unwrap()
            .unwrap();
        assert!(started.elapsed() < RETRY_PAUSE);
    }
}
