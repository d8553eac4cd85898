use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use konchina_engine::GameState;
use tokio::sync::watch;
use tracing::trace;

use super::{DocumentStore, RoomWatch, Versioned};
use crate::error::SyncError;

type Slot = watch::Sender<Option<Versioned<GameState>>>;

/// In-process store; each room is a watch channel holding the latest commit.
///
/// The compare-and-swap runs while the room's map shard is locked, so two
/// writers racing on the same room are serialised and exactly one wins.
#[derive(Default)]
pub struct MemoryDocumentStore {
    rooms: DashMap<String, Slot>,
    conflicts: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes refused because of a version mismatch.
    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    pub fn room_count(&self) -> usize {
        self.rooms
            .iter()
            .filter(|slot| slot.value().borrow().is_some())
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, room_id: &str) -> Result<Option<Versioned<GameState>>, SyncError> {
        Ok(self
            .rooms
            .get(room_id)
            .and_then(|slot| slot.value().borrow().clone()))
    }

    async fn compare_and_swap(
        &self,
        room_id: &str,
        expected_version: Option<u64>,
        doc: GameState,
    ) -> Result<u64, SyncError> {
        let slot = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| watch::channel(None).0);

        let mut result = Err(SyncError::internal("compare_and_swap did not run"));
        slot.send_if_modified(|current| {
            let actual = current.as_ref().map(|v| v.version);
            if actual != expected_version {
                result = Err(SyncError::version_conflict(expected_version, actual));
                return false;
            }
            let version = actual.map_or(1, |v| v + 1);
            *current = Some(Versioned { version, doc });
            result = Ok(version);
            true
        });

        match &result {
            Ok(version) => trace!(room_id, version, "Document committed"),
            Err(_) => {
                self.conflicts.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn subscribe(&self, room_id: &str) -> RoomWatch {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }
}
