use konchina_engine::errors::{ConflictKind, DomainError, ValidationKind};
use thiserror::Error;

use crate::errors::ErrorCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The engine refused the transition; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The stored document is not at the version the writer read.
    #[error("Version conflict: expected {expected:?}, actual {actual:?}")]
    VersionConflict {
        expected: Option<u64>,
        actual: Option<u64>,
    },
    #[error("Transaction abandoned after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },
    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl SyncError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SyncError::Domain(err) => domain_code(err),
            SyncError::VersionConflict { .. } => ErrorCode::OptimisticLock,
            SyncError::RetriesExhausted { .. } => ErrorCode::RetriesExhausted,
            SyncError::RoomNotFound { .. } => ErrorCode::RoomNotFound,
            SyncError::Config { .. } => ErrorCode::ConfigError,
            SyncError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Only write conflicts are worth re-running the transaction for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::VersionConflict { .. })
    }

    pub fn version_conflict(expected: Option<u64>, actual: Option<u64>) -> Self {
        Self::VersionConflict { expected, actual }
    }

    pub fn room_not_found(room_id: impl Into<String>) -> Self {
        Self::RoomNotFound {
            room_id: room_id.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

fn domain_code(err: &DomainError) -> ErrorCode {
    match err {
        DomainError::Validation(kind, _) => match kind {
            ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
            ValidationKind::OutOfTurn => ErrorCode::OutOfTurn,
            ValidationKind::CardNotInHand => ErrorCode::CardNotInHand,
            ValidationKind::CardNotOnTable => ErrorCode::CardNotOnTable,
            ValidationKind::IllegalCapture => ErrorCode::IllegalCapture,
            ValidationKind::ParseCard => ErrorCode::ParseCard,
            ValidationKind::UnknownPlayer => ErrorCode::PlayerNotFound,
            ValidationKind::StaleSequence => ErrorCode::StaleSequence,
            _ => ErrorCode::ValidationError,
        },
        DomainError::Conflict(kind, _) => match kind {
            ConflictKind::RoomFull => ErrorCode::RoomFull,
            ConflictKind::AlreadyFinished => ErrorCode::GameFinished,
            _ => ErrorCode::Conflict,
        },
        DomainError::Invariant(_) => ErrorCode::InvariantViolation,
    }
}
