//! Versioned document storage for room state.
//!
//! A store holds one `GameState` document per room together with a version
//! number that goes up by one on every committed write. Writers never
//! overwrite blindly: `compare_and_swap` only succeeds if the document is
//! still at the version the writer read.

pub mod memory;

use async_trait::async_trait;
use konchina_engine::GameState;
use tokio::sync::watch;

use crate::error::SyncError;

pub use memory::MemoryDocumentStore;

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub doc: T,
}

/// Latest committed state of a room, `None` until the room exists.
pub type RoomWatch = watch::Receiver<Option<Versioned<GameState>>>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current document and version, if the room exists.
    async fn get(&self, room_id: &str) -> Result<Option<Versioned<GameState>>, SyncError>;

    /// Write `doc` if the stored version still equals `expected_version`.
    ///
    /// `None` means "create, the room must not exist yet". Returns the new
    /// version; a mismatch is `SyncError::VersionConflict`.
    async fn compare_and_swap(
        &self,
        room_id: &str,
        expected_version: Option<u64>,
        doc: GameState,
    ) -> Result<u64, SyncError>;

    /// Receive a full copy of the room after every committed write.
    fn subscribe(&self, room_id: &str) -> RoomWatch;
}
