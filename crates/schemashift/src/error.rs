//! Error types for the schema diff engine.

use std::path::PathBuf;

/// Errors that can occur while configuring a diff or loading snapshots.
///
/// Diffing itself never fails: structural anomalies in the snapshots are
/// reported as warnings on the individual changes.
#[derive(Debug, thiserror::Error)]
pub enum SchemaShiftError {
    /// A configuration value was rejected before any diffing started.
    #[error("Invalid option '{option}': {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unknown SQL dialect name.
    #[error("Unknown dialect '{0}' (expected one of: ansi, postgres, mysql, sqlite)")]
    UnknownDialect(String),

    /// IO error (reading snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file could not be decoded.
    #[error("Failed to parse schema snapshot '{path}': {source}")]
    Snapshot {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying decoding error.
        source: serde_json::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for schema diff operations.
pub type Result<T> = std::result::Result<T, SchemaShiftError>;
