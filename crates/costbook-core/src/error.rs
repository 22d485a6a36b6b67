//! # Error Types
//!
//! Domain-specific error types for costbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  costbook-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  costbook-report errors (separate crate)                               │
//! │  └── ReportError      - Config, snapshot, rendering failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ReportError → CLI exit message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! The BOM resolver never returns an error. Missing references, cycles and
//! non-positive output quantities are reported through the `has_cycle` and
//! `unresolved` flags on [`crate::BomCostSummary`].

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// BOM cannot be found.
    ///
    /// ## When This Occurs
    /// - Looking up a summary for an id that was never part of the input set
    /// - BOM was deleted between edit and recompute
    #[error("BOM not found: {0}")]
    BomNotFound(String),

    /// Target margin cannot be reached.
    ///
    /// ## When This Occurs
    /// A margin of 100% or more would require an infinite price:
    /// ```text
    /// price = cost / (1 - margin)
    ///              │
    ///              ▼
    /// margin = 10000 bps → division by zero
    /// ```
    #[error("Target margin must be below 100% (got {bps} bps)")]
    InvalidMargin { bps: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// The surrounding application checks them before saving; the resolver
/// itself tolerates all of them.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid id characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// BOM line references the BOM that owns it.
    #[error("BOM {bom_id} lists itself as a component")]
    SelfReference { bom_id: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
