//! # costbook-core: Pure Costing Logic for Costbook
//!
//! This crate is the **heart** of Costbook. It contains all costing logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Costbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │    Materials ──► BOM editor ──► Cost sheets ──► Warnings        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ materials + BOM records               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ costbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    bom    │  │cost_sheet │  │   │
//! │  │   │ Material  │  │   Money   │  │ resolver  │  │  pricing  │  │   │
//! │  │   │ BomRecord │  │   Rate    │  │  cycles   │  │  margins  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ BomCostMap                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           costbook-report (state, config, CLI report)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Material, BomRecord, BomLine, BomCostSummary)
//! - [`money`] - Money type with integer cents and rounding helpers
//! - [`bom`] - BOM cost roll-up with cycle detection
//! - [`diagnostics`] - User-facing warnings derived from cost flags
//! - [`purchase`] - Material unit costs derived from purchase records
//! - [`cost_sheet`] - Materials + labor + overhead costing and pricing
//! - [`validation`] - Input validation before records are saved
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, no hidden state
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Degrade, Don't Fail**: broken references become flags, not errors
//!
//! ## Example Usage
//!
//! ```rust
//! use costbook_core::{compute_bom_cost_map, index_materials, BomLine, BomRecord, Material};
//!
//! let flour = Material::new("Flour", 250).with_id("M1");
//! let dough = BomRecord::new("Dough", 1.0)
//!     .with_id("Sub")
//!     .with_line(BomLine::material("M1", 2.0));
//! let loaf = BomRecord::new("Loaf", 1.0)
//!     .with_id("Top")
//!     .with_line(BomLine::subassembly("Sub", 4.0));
//!
//! let costs = compute_bom_cost_map(&[dough, loaf], &index_materials([&flour]));
//! assert_eq!(costs["Top"].total_cost_cents, 2000);
//! assert!(costs["Top"].is_clean());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bom;
pub mod cost_sheet;
pub mod diagnostics;
pub mod error;
pub mod money;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bom::{compute_bom_cost_map, summary_for};
pub use cost_sheet::{compute_cost_sheet, CostSheet, CostSheetTotals, PricingStrategy};
pub use diagnostics::BomWarning;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use purchase::{apply_purchase_costs, CostMethod, PurchaseRecord};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest target margin a cost sheet accepts, in basis points (99.99%).
pub const MAX_TARGET_MARGIN_BPS: u32 = 9_999;

/// Highest markup a cost sheet accepts, in basis points (1000%).
pub const MAX_MARKUP_BPS: u32 = 100_000;
