//! Error handling for the Konchina engine.

pub mod domain;

pub use domain::{ConflictKind, DomainError, ValidationKind};
