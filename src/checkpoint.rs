//! Per-wiki checkpoint persistence.
//!
//! The engine only needs get/set of each wiki's last successfully covered
//! window end; where that lives is up to the store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Abstract store for `last_check_time` per wiki id.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last stored checkpoint for the wiki, if any.
    async fn get(&self, wiki_id: u64) -> Option<DateTime<Utc>>;

    /// Records the wiki's checkpoint. Stores must never regress a
    /// checkpoint on their own.
    async fn set(&self, wiki_id: u64, checkpoint: DateTime<Utc>);
}

/// Process-local store; checkpoints are lost on restart, so the first cycle
/// after startup covers everything since the configured start time.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    checkpoints: Mutex<HashMap<u64, DateTime<Utc>>>,
}

impl MemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, wiki_id: u64) -> Option<DateTime<Utc>> {
        self.checkpoints.lock().await.get(&wiki_id).copied()
    }

    async fn set(&self, wiki_id: u64, checkpoint: DateTime<Utc>) {
        self.checkpoints.lock().await.insert(wiki_id, checkpoint);
    }
}
