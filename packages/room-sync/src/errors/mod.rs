//! Error codes for the synchronization layer.

pub mod error_code;

pub use error_code::ErrorCode;
