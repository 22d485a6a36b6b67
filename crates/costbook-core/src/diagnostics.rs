//! # Cost Diagnostics
//!
//! Turns the resolver's boolean flags into warnings a user can act on.
//!
//! ```text
//! BomCostSummary { has_cycle: true, unresolved: true }
//!      │
//!      ▼
//! [CircularReference, IncompleteLinks]
//!      │
//!      ▼
//! "Circular reference detected", "Incomplete component links"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A problem found while costing a BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BomWarning {
    /// The BOM depends on itself, directly or through other BOMs.
    CircularReference,
    /// A material or BOM reference is missing; a cached cost was used.
    IncompleteLinks,
}

impl BomWarning {
    /// Message shown next to the BOM's cost.
    pub const fn message(&self) -> &'static str {
        match self {
            BomWarning::CircularReference => "Circular reference detected",
            BomWarning::IncompleteLinks => "Incomplete component links",
        }
    }
}

impl fmt::Display for BomWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BomCostSummary;

    fn summary(has_cycle: bool, unresolved: bool) -> BomCostSummary {
        BomCostSummary {
            total_cost_cents: 0,
            unit_cost_cents: Some(0),
            has_cycle,
            unresolved,
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            BomWarning::CircularReference.to_string(),
            "Circular reference detected"
        );
        assert_eq!(
            BomWarning::IncompleteLinks.to_string(),
            "Incomplete component links"
        );
    }

    #[test]
    fn test_warnings_follow_flags() {
        assert_eq!(
            summary(true, true).warnings(),
            vec![BomWarning::CircularReference, BomWarning::IncompleteLinks]
        );
        assert_eq!(
            summary(false, true).warnings(),
            vec![BomWarning::IncompleteLinks]
        );
        assert!(summary(false, false).warnings().is_empty());
    }
}
