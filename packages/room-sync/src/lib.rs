//! Synchronization layer for Konchina rooms.
//!
//! Two peers never talk to each other directly. Each one reads the room
//! document, applies an engine transition to that fresh copy and writes it
//! back with a version check; losers of a race re-read and try again. Both
//! peers converge by subscribing to the document.

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod broker;
pub mod client;
pub mod config;
pub mod error;
pub mod errors;
pub mod rooms;
pub mod store;
pub mod telemetry;
pub mod txn;

pub use broker::{RoomBroker, RoomEvent};
pub use client::RoomClient;
pub use config::SyncConfig;
pub use error::SyncError;
pub use errors::ErrorCode;
pub use rooms::{is_stale, Commit, RoomService, TimeoutOutcome};
pub use store::{DocumentStore, MemoryDocumentStore, RoomWatch, Versioned};
pub use txn::{with_room_txn, TxnCommit};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    konchina_test_support::test_logging::init();
}
