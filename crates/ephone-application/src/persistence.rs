//! Snapshot persistence shared by the cart ledger and the chat session.
//!
//! Engines own their state in memory and treat storage as a fire-and-forget
//! sink. Each storage key gets one [`SnapshotWriter`]: a background task fed
//! through an unbounded channel that applies writes strictly in the order
//! they were scheduled. Every write carries the full snapshot, so a burst of
//! queued saves collapses to the newest one.

use ephone_core::error::Result;
use ephone_core::storage::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Reads and decodes the JSON snapshot stored under `key`.
pub async fn load_snapshot<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

enum WriteCommand {
    Save(Vec<u8>),
    Delete,
    Flush(oneshot::Sender<()>),
}

/// Serialized, fire-and-forget writer for one storage key.
///
/// Failures are logged and dropped; callers never wait on storage unless
/// they explicitly [`flush`](Self::flush).
pub struct SnapshotWriter {
    key: String,
    sender: mpsc::UnboundedSender<WriteCommand>,
}

impl SnapshotWriter {
    /// Starts the writer task for `key`. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, key.clone(), receiver));
        Self { key, sender }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Schedules a write of `value`'s JSON encoding.
    pub fn save<T>(&self, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.send(WriteCommand::Save(bytes)),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "Failed to encode snapshot");
            }
        }
    }

    /// Schedules deletion of the stored snapshot.
    pub fn delete(&self) {
        self.send(WriteCommand::Delete);
    }

    /// Waits until every write scheduled so far has been attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(WriteCommand::Flush(done));
        let _ = wait.await;
    }

    fn send(&self, command: WriteCommand) {
        if self.sender.send(command).is_err() {
            tracing::warn!(key = %self.key, "Snapshot writer has stopped; dropping write");
        }
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    mut receiver: mpsc::UnboundedReceiver<WriteCommand>,
) {
    let mut pending = receiver.recv().await;
    while let Some(command) = pending.take() {
        match command {
            WriteCommand::Save(mut bytes) => {
                // Collapse consecutive saves into the newest snapshot.
                let mut next = None;
                while let Ok(queued) = receiver.try_recv() {
                    match queued {
                        WriteCommand::Save(newer) => bytes = newer,
                        other => {
                            next = Some(other);
                            break;
                        }
                    }
                }
                if let Err(err) = store.set(&key, bytes).await {
                    tracing::warn!(key = %key, error = %err, "Failed to persist snapshot");
                }
                if next.is_some() {
                    pending = next;
                    continue;
                }
            }
            WriteCommand::Delete => {
                if let Err(err) = store.delete(&key).await {
                    tracing::warn!(key = %key, error = %err, "Failed to delete snapshot");
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
        pending = receiver.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, RecordingStore};

    #[tokio::test]
    async fn test_saves_apply_in_order_and_last_wins() {
        let store = Arc::new(RecordingStore::default());
        let writer = SnapshotWriter::spawn(store.clone(), "k");

        writer.save(&vec![1]);
        writer.save(&vec![1, 2]);
        writer.save(&vec![1, 2, 3]);
        writer.flush().await;

        let stored: Option<Vec<u32>> = load_snapshot(store.as_ref(), "k").await.unwrap();
        assert_eq!(stored, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_delete_after_save_wins() {
        let store = Arc::new(RecordingStore::default());
        let writer = SnapshotWriter::spawn(store.clone(), "k");

        writer.save(&"snapshot");
        writer.delete();
        writer.flush().await;

        assert!(store.get("k").await.unwrap().is_none());
        assert_eq!(store.deletes(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let writer = SnapshotWriter::spawn(Arc::new(FailingStore), "k");
        writer.save(&vec![1]);
        writer.delete();
        writer.flush().await;
        assert_eq!(writer.key(), "k");
    }

    #[tokio::test]
    async fn test_load_snapshot_reports_corrupt_data() {
        let store = RecordingStore::default();
        store.set("k", b"not json".to_vec()).await.unwrap();
        let result: Result<Option<Vec<u32>>> = load_snapshot(&store, "k").await;
        assert!(result.unwrap_err().is_serialization());
    }
}
