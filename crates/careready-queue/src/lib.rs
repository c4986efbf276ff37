// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pub/sub client over the durable storage queue.
//!
//! Producers serialize typed events and publish them to a named queue.
//! Consumers register a [`QueueHandler`] via [`QueueClient::subscribe`],
//! which spawns a long-polling loop: each received entry is handed to the
//! handler, acked on success, and failed on error so the storage layer can
//! redeliver it or dead-letter it once attempts run out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use careready_config::model::QueueConfig;
use careready_core::CarereadyError;
use careready_storage::queries::queue;
use careready_storage::{Database, QueueEntry};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Delivery attempts before an entry is dead-lettered.
const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Processes one queue entry at a time.
///
/// Returning `Err` counts as a failed attempt and triggers redelivery.
/// Handlers must therefore be idempotent.
#[async_trait]
pub trait QueueHandler: Send + Sync {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError>;
}

/// Typed publish/subscribe interface over the storage queue.
#[derive(Clone)]
pub struct QueueClient {
    db: Database,
    config: QueueConfig,
}

impl QueueClient {
    pub fn new(db: Database, config: QueueConfig) -> Self {
        Self { db, config }
    }

    /// Serialize an event and append it to the named queue.
    pub async fn publish<T: Serialize>(
        &self,
        queue_name: &str,
        event: &T,
    ) -> Result<i64, CarereadyError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| CarereadyError::queue("failed to serialize event", e))?;
        let id = queue::enqueue(&self.db, queue_name, &payload, DEFAULT_MAX_ATTEMPTS).await?;
        debug!(queue = queue_name, entry_id = id, "published event");
        Ok(id)
    }

    /// Wait up to the configured long-poll window for one entry.
    ///
    /// Polls the queue at the configured interval and returns `None` when
    /// the window closes without a deliverable entry.
    pub async fn receive(&self, queue_name: &str) -> Result<Option<QueueEntry>, CarereadyError> {
        let visibility = Duration::from_secs(self.config.visibility_timeout_secs);
        let window = Duration::from_secs(self.config.wait_time_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let deadline = tokio::time::Instant::now() + window;

        loop {
            if let Some(entry) = queue::dequeue(&self.db, queue_name, visibility).await? {
                return Ok(Some(entry));
            }
            if tokio::time::Instant::now() + interval > deadline {
                return Ok(None);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Mark an entry as successfully handled.
    pub async fn ack(&self, entry_id: i64) -> Result<(), CarereadyError> {
        queue::ack(&self.db, entry_id).await
    }

    /// Record a handling failure, scheduling redelivery or dead-lettering.
    pub async fn fail(&self, entry_id: i64) -> Result<(), CarereadyError> {
        queue::fail(&self.db, entry_id).await
    }

    /// Spawn a consumer loop for the named queue.
    ///
    /// The loop runs until the token is cancelled. Poll errors back off for
    /// the configured interval instead of tearing the consumer down.
    pub fn subscribe(
        &self,
        queue_name: &'static str,
        handler: Arc<dyn QueueHandler>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let client = self.clone();
        let backoff = Duration::from_secs(self.config.error_backoff_secs);

        tokio::spawn(async move {
            info!(queue = queue_name, "consumer started");
            loop {
                tokio::select! {
                    received = client.receive(queue_name) => {
                        match received {
                            Ok(Some(entry)) => {
                                client.dispatch(queue_name, entry, handler.as_ref()).await;
                            }
                            Ok(None) => {}
                            Err(e) => {
                                error!(queue = queue_name, error = %e, "queue poll failed");
                                tokio::select! {
                                    _ = tokio::time::sleep(backoff) => {}
                                    _ = cancel.cancelled() => break,
                                }
                            }
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
            info!(queue = queue_name, "consumer stopped");
        })
    }

    async fn dispatch(&self, queue_name: &str, entry: QueueEntry, handler: &dyn QueueHandler) {
        let entry_id = entry.id;
        match handler.handle(&entry.payload).await {
            Ok(()) => {
                if let Err(e) = self.ack(entry_id).await {
                    error!(queue = queue_name, entry_id, error = %e, "ack failed");
                }
            }
            Err(e) => {
                warn!(
                    queue = queue_name,
                    entry_id,
                    attempt = entry.attempts,
                    error = %e,
                    "handler failed, scheduling retry"
                );
                if let Err(e) = self.fail(entry_id).await {
                    error!(queue = queue_name, entry_id, error = %e, "failure record failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        appointment_id: String,
    }

    fn test_config() -> QueueConfig {
        QueueConfig {
            wait_time_secs: 1,
            poll_interval_ms: 10,
            error_backoff_secs: 1,
            visibility_timeout_secs: 300,
        }
    }

    async fn test_client() -> (QueueClient, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("queue.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (QueueClient::new(db, test_config()), dir)
    }

    struct CountingHandler {
        handled: Arc<AtomicUsize>,
        fail_first: bool,
    }

    #[async_trait]
    impl QueueHandler for CountingHandler {
        async fn handle(&self, _payload: &str) -> Result<(), CarereadyError> {
            let n = self.handled.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(CarereadyError::Internal("transient".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_then_receive_round_trips_the_event() {
        let (client, _dir) = test_client().await;
        let event = Ping {
            appointment_id: "appt-1".to_string(),
        };
        client.publish("test-queue", &event).await.unwrap();

        let entry = client.receive("test-queue").await.unwrap().unwrap();
        let decoded: Ping = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn receive_returns_none_when_window_closes_empty() {
        let (client, _dir) = test_client().await;
        let got = client.receive("empty-queue").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn subscribe_acks_handled_entries() {
        let (client, _dir) = test_client().await;
        let handled = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingHandler {
            handled: handled.clone(),
            fail_first: false,
        });

        let cancel = CancellationToken::new();
        let task = client.subscribe("test-queue", handler, cancel.clone());

        client
            .publish("test-queue", &Ping { appointment_id: "a".to_string() })
            .await
            .unwrap();

        // Wait for the consumer to pick the entry up.
        for _ in 0..100 {
            if handled.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        cancel.cancel();
        task.await.unwrap();

        assert_eq!(handled.load(Ordering::SeqCst), 1);
        // The entry was acked, nothing left to receive.
        assert!(client.receive("test-queue").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_entries_are_redelivered() {
        let (client, _dir) = test_client().await;
        let handled = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingHandler {
            handled: handled.clone(),
            fail_first: true,
        });

        let cancel = CancellationToken::new();
        let task = client.subscribe("test-queue", handler, cancel.clone());

        client
            .publish("test-queue", &Ping { appointment_id: "a".to_string() })
            .await
            .unwrap();

        for _ in 0..200 {
            if handled.load(Ordering::SeqCst) >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        cancel.cancel();
        task.await.unwrap();

        // First attempt failed, second succeeded.
        assert_eq!(handled.load(Ordering::SeqCst), 2);
    }
}
