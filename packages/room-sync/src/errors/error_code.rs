//! Error codes for the room synchronization layer.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and are what callers match on.

use core::fmt;

/// Centralized error codes surfaced by `SyncError::code()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Move validation
    /// Transition not allowed in the room's current status
    PhaseMismatch,
    /// Not the submitting player's turn
    OutOfTurn,
    /// Played card is not in the player's hand
    CardNotInHand,
    /// Selected capture card is not on the table
    CardNotOnTable,
    /// Selection is not a legal capture for the played card
    IllegalCapture,
    /// Card token could not be parsed
    ParseCard,
    /// Player is not seated in the room
    PlayerNotFound,
    /// Report or ack refers to a sequence the room has moved past
    StaleSequence,
    /// General validation error
    ValidationError,

    // Room conflicts
    /// Room already has two players
    RoomFull,
    /// Room has already finished
    GameFinished,
    /// General conflict
    Conflict,

    // Storage
    /// Document changed between read and write
    OptimisticLock,
    /// Transaction kept conflicting until the attempt limit
    RetriesExhausted,
    /// No document for the room id
    RoomNotFound,

    // System
    /// Engine invariant broken
    InvariantViolation,
    /// Invalid configuration
    ConfigError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::CardNotOnTable => "CARD_NOT_ON_TABLE",
            Self::IllegalCapture => "ILLEGAL_CAPTURE",
            Self::ParseCard => "PARSE_CARD",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::StaleSequence => "STALE_SEQUENCE",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::RoomFull => "ROOM_FULL",
            Self::GameFinished => "GAME_FINISHED",
            Self::Conflict => "CONFLICT",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::RetriesExhausted => "RETRIES_EXHAUSTED",
            Self::RoomNotFound => "ROOM_NOT_FOUND",

            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
