//! Error types for the arena simulation.
//!
//! Routine spatial misses (no path, blocked cell, out-of-bounds query)
//! are expressed as `Option`/`bool` results, never as errors; the
//! variants here cover genuine precondition violations only.

use thiserror::Error;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for the arena simulation.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// Generation or simulation configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid entity reference in a driver command.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },
}
