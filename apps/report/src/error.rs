//! # Report Error Types
//!
//! Error types for the report application.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io / toml / serde_json errors        CoreError (costbook-core)        │
//! │            │                                   │                        │
//! │            └──────────────┬────────────────────┘                        │
//! │                           ▼                                             │
//! │              ReportError (this module) ← adds context                  │
//! │                           │                                             │
//! │                           ▼                                             │
//! │              main() prints it and exits with status 1                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use costbook_core::CoreError;
use thiserror::Error;

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Report application errors.
#[derive(Debug, Error)]
pub enum ReportError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Config parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    /// No snapshot path given on the command line, environment, or config.
    #[error("No snapshot given. Pass --snapshot or set COSTBOOK_SNAPSHOT.")]
    MissingSnapshot,

    /// Failed to read or parse the snapshot.
    #[error("Failed to load snapshot {path}: {reason}")]
    SnapshotLoadFailed { path: String, reason: String },

    /// Failed to serialize report output.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Error raised by costbook-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ReportError {
    /// Creates a SnapshotLoadFailed error.
    pub fn snapshot(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        ReportError::SnapshotLoadFailed {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(err: toml::de::Error) -> Self {
        ReportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::SerializationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_message() {
        let err = ReportError::snapshot("/tmp/boms.json", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "Failed to load snapshot /tmp/boms.json: expected value at line 1"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ReportError = CoreError::BomNotFound("cake".to_string()).into();
        assert_eq!(err.to_string(), "BOM not found: cake");
    }
}
