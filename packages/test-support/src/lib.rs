//! Test support utilities shared by the engine and sync-layer test suites.
//!
//! Provides unified logging initialisation and ULID-based unique identifiers
//! so concurrently running tests never share a room.

pub mod test_logging;

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use konchina_test_support::unique_str;
///
/// let id1 = unique_str("room");
/// let id2 = unique_str("room");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("room-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Unique room id for a test.
pub fn unique_room_id() -> String {
    unique_str("room")
}

/// A pair of distinct player ids (host, joiner) for a test room.
pub fn unique_players() -> (String, String) {
    (unique_str("host"), unique_str("guest"))
}
