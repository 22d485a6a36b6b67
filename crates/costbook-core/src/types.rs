//! # Domain Types
//!
//! Core domain types used throughout Costbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Material     │   │   BomRecord     │   │    BomLine      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  id             │──►│  component ─────┼──┐    │
//! │  │  unit_cost_cents│   │  output_qty     │   │  quantity       │  │    │
//! │  │  is_active      │   │  lines          │   │  unit_cost_cents│  │    │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘  │    │
//! │          ▲                     ▲                                  │    │
//! │          │                     │         ┌────────────────────┐   │    │
//! │          │                     └─────────│ Component          │◄──┘    │
//! │          └───────────────────────────────│  Material(id?)     │        │
//! │                                          │  Subassembly(id?)  │        │
//! │                                          └────────────────────┘        │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────┐                        │
//! │  │   BomCostSummary     │   │      Rate       │                        │
//! │  │  total_cost_cents    │   │  bps (u32)      │                        │
//! │  │  unit_cost_cents?    │   │  2500 = 25%     │                        │
//! │  │  has_cycle           │   └─────────────────┘                        │
//! │  │  unresolved          │                                              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! All types serialize camelCase so the renderer reads them as-is, and
//! `ts-rs` exports matching TypeScript definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::diagnostics::BomWarning;
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 2500 bps = 25%.
/// Used for markups and target margins on cost sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Material
// =============================================================================

/// A purchasable input (flour, fabric, screws...).
///
/// Read-only to the resolver. Inactive materials still resolve costs;
/// `is_active` only drives what the catalog screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Unit of measure the cost applies to ("kg", "m", "each").
    #[serde(default)]
    pub unit: String,

    /// Cost of one unit in cents.
    pub unit_cost_cents: i64,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Material {
    /// Creates an active material with a generated id.
    pub fn new(name: impl Into<String>, unit_cost_cents: i64) -> Self {
        Material {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            unit: String::new(),
            unit_cost_cents,
            is_active: true,
        }
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }
}

/// Lookup of materials by id, as handed to the resolver.
pub type MaterialIndex = HashMap<String, Material>;

/// Builds a [`MaterialIndex`]. Later entries win on duplicate ids.
pub fn index_materials<'a>(materials: impl IntoIterator<Item = &'a Material>) -> MaterialIndex {
    materials
        .into_iter()
        .map(|m| (m.id.clone(), m.clone()))
        .collect()
}

// =============================================================================
// Component
// =============================================================================

/// What a BOM line consumes.
///
/// The reference is optional in both variants: a material line without an
/// id is an ad-hoc input priced by the line's cached cost, while a
/// subassembly line without an id is an incomplete link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "componentType")]
pub enum Component {
    #[serde(rename = "material")]
    Material {
        #[serde(rename = "materialId")]
        material_id: Option<String>,
    },

    #[serde(rename = "bom_item")]
    Subassembly {
        #[serde(rename = "componentBomId")]
        bom_id: Option<String>,
    },
}

impl Component {
    /// A line consuming the given material.
    pub fn material(id: impl Into<String>) -> Self {
        Component::Material {
            material_id: Some(id.into()),
        }
    }

    /// A line consuming another BOM.
    pub fn subassembly(id: impl Into<String>) -> Self {
        Component::Subassembly {
            bom_id: Some(id.into()),
        }
    }
}

// =============================================================================
// BOM Line
// =============================================================================

/// One component row of a BOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BomLine {
    #[serde(default)]
    pub id: String,

    pub component: Component,

    /// Units of the component consumed per batch of the parent.
    pub quantity: f64,

    /// Cached unit cost, used only when the reference cannot be resolved.
    #[serde(default)]
    pub unit_cost_cents: i64,
}

impl BomLine {
    /// Creates a line with a generated id and no cached cost.
    pub fn new(component: Component, quantity: f64) -> Self {
        BomLine {
            id: Uuid::new_v4().to_string(),
            component,
            quantity,
            unit_cost_cents: 0,
        }
    }

    /// Shorthand for a material line.
    pub fn material(material_id: impl Into<String>, quantity: f64) -> Self {
        Self::new(Component::material(material_id), quantity)
    }

    /// Shorthand for a subassembly line.
    pub fn subassembly(bom_id: impl Into<String>, quantity: f64) -> Self {
        Self::new(Component::subassembly(bom_id), quantity)
    }

    /// Sets the cached fallback cost.
    pub fn with_cached_cost(mut self, unit_cost_cents: i64) -> Self {
        self.unit_cost_cents = unit_cost_cents;
        self
    }
}

// =============================================================================
// BOM Record
// =============================================================================

/// A bill of materials: one batch consumes `lines` and yields `output_qty`
/// units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BomRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub output_qty: f64,

    #[serde(default)]
    pub lines: Vec<BomLine>,
}

impl BomRecord {
    /// Creates an empty BOM with a generated id.
    pub fn new(name: impl Into<String>, output_qty: f64) -> Self {
        BomRecord {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            output_qty,
            lines: Vec::new(),
        }
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Appends a line.
    pub fn with_line(mut self, line: BomLine) -> Self {
        self.lines.push(line);
        self
    }
}

// =============================================================================
// BOM Cost Summary
// =============================================================================

/// Derived cost of one BOM. Never stored; recomputed on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BomCostSummary {
    /// Cost of one batch, never negative.
    pub total_cost_cents: i64,

    /// Cost per output unit; `None` when the output quantity is not positive.
    pub unit_cost_cents: Option<i64>,

    /// Resolving this BOM ran into a component already on the resolution path.
    pub has_cycle: bool,

    /// Some reference (direct or transitive) could not be resolved.
    pub unresolved: bool,
}

impl BomCostSummary {
    /// Placeholder returned when a BOM is reached again while still being
    /// resolved.
    pub(crate) const CYCLE_SENTINEL: BomCostSummary = BomCostSummary {
        total_cost_cents: 0,
        unit_cost_cents: None,
        has_cycle: true,
        unresolved: true,
    };

    /// Returns the batch total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    /// Returns the unit cost as Money, if defined.
    #[inline]
    pub fn unit_cost(&self) -> Option<Money> {
        self.unit_cost_cents.map(Money::from_cents)
    }

    /// True when neither diagnostic flag is set.
    #[inline]
    pub fn is_clean(&self) -> bool {
        !self.has_cycle && !self.unresolved
    }

    /// User-facing warnings for this summary, cycle first.
    pub fn warnings(&self) -> Vec<BomWarning> {
        let mut warnings = Vec::new();
        if self.has_cycle {
            warnings.push(BomWarning::CircularReference);
        }
        if self.unresolved {
            warnings.push(BomWarning::IncompleteLinks);
        }
        warnings
    }
}

/// Cost summaries keyed by BOM id.
pub type BomCostMap = HashMap<String, BomCostSummary>;

// =============================================================================
// Unit Tests
// =============================================================================
