//! # Validation Module
//!
//! Input validation utilities for Costbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Editor forms (TypeScript)                                    │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before a record is saved)                       │
//! │  ├── Finite, non-negative quantities                                   │
//! │  └── Self-referencing BOM lines                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Resolver                                                      │
//! │  └── Accepts anything; reports leftovers as has_cycle / unresolved     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costbook_core::validation::{validate_name, validate_quantity};
//!
//! assert!(validate_name("Sourdough starter").is_ok());
//! assert!(validate_quantity(0.35).is_ok());
//! assert!(validate_quantity(f64::NAN).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{BomRecord, Component};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted entity id.
const MAX_ID_LEN: usize = 64;

/// Longest accepted display name.
const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity id (material, BOM, line).
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, numbers, hyphens, underscores only (UUIDs pass)
pub fn validate_entity_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a component quantity: finite and not negative. Zero is allowed
/// (a line kept for reference).
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "quantity".to_string(),
        });
    }

    if qty < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a BOM output quantity: finite and strictly positive.
///
/// ## User Workflow
/// ```text
/// Output qty: 0
///      │
///      ▼
/// validate_output_qty(0.0) ← THIS FUNCTION
///      │
///      ▼
/// "output quantity must be positive"
/// (the resolver would show "unit cost: —" instead)
/// ```
pub fn validate_output_qty(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "output quantity".to_string(),
        });
    }

    if qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "output quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a cost in cents. Zero is allowed (free samples, offcuts).
pub fn validate_cost_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "cost".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a markup or margin rate in basis points.
///
/// Markups may exceed 100%; margins may not, so callers pass the ceiling.
pub fn validate_rate_bps(bps: u32, max_bps: u32) -> ValidationResult<()> {
    if bps > max_bps {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: max_bps as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a whole BOM record, returning every problem found.
///
/// An empty result means the record is clean.
pub fn validate_bom_record(bom: &BomRecord) -> Vec<ValidationError> {
    let mut problems = Vec::new();

    if let Err(e) = validate_entity_id(&bom.id) {
        problems.push(e);
    }
    if let Err(e) = validate_name(&bom.name) {
        problems.push(e);
    }
    if let Err(e) = validate_output_qty(bom.output_qty) {
        problems.push(e);
    }

    for line in &bom.lines {
        if let Err(e) = validate_quantity(line.quantity) {
            problems.push(e);
        }
        if let Err(e) = validate_cost_cents(line.unit_cost_cents) {
            problems.push(e);
        }
        if let Component::Subassembly { bom_id: Some(id) } = &line.component {
            if *id == bom.id {
                problems.push(ValidationError::SelfReference {
                    bom_id: bom.id.clone(),
                });
            }
        }
    }

    problems
}

// =============================================================================
// Unit Tests
// =============================================================================
