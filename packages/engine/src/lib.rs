//! Konchina game engine.
//!
//! Pure, synchronous rules and state transitions for a two-player capture
//! card game. Every transition works on a `GameState` in place and either
//! succeeds or returns a `DomainError` without touching the state, so a
//! storage layer can wrap it in a read-compute-write transaction and simply
//! re-run it against a fresh copy on conflict.

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod domain;
pub mod errors;

pub use domain::{
    acknowledge_round_score, apply_move, clear_round_score, create_room, derive_room_transitions,
    determine_winner, forfeit, is_legal_capture, join_room, legal_captures, record_timeout, Card,
    GameOutcome, GameRules, GameState, GameStatus, JoinOutcome, MoveOutcome, PlayerId,
    PlayerSnapshot, Rank, RoomTransition, Suit,
};
pub use errors::DomainError;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    konchina_test_support::test_logging::init();
}
