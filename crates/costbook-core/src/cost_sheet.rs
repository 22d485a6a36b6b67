//! # Cost Sheets
//!
//! A cost sheet prices one batch of a product from three buckets and then
//! derives a selling price.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cost Sheet: Sourdough (12 loaves)                 │
//! │                                                                         │
//! │  Materials   flour 6 kg @ 240¢, starter BOM ×1        ──►  1,740¢       │
//! │  Labor       2.5 h @ 1,800¢                            ──►  4,500¢       │
//! │  Overhead    oven gas                                  ──►    300¢       │
//! │                                                        ─────────────    │
//! │  Batch total                                               6,540¢       │
//! │  Unit cost (÷ 12)                                            545¢       │
//! │                                                                         │
//! │  Pricing: target margin 40% → 545 × 10000 / 6000         ──►  908¢      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Material rows resolve like BOM lines, except subassemblies are read from
//! an already computed [`BomCostMap`] instead of being resolved again.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::{non_negative_quantity, Money};
use crate::types::{BomCostMap, Component, MaterialIndex, Rate};

/// Basis points in 100%.
const FULL_RATE_BPS: u32 = 10_000;

// =============================================================================
// Sheet Types
// =============================================================================

/// A material or subassembly consumed by the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostSheetMaterial {
    pub component: Component,
    pub quantity: f64,
    /// Fallback when the reference cannot be resolved.
    #[serde(default)]
    pub unit_cost_cents: i64,
}

/// Time spent making the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaborLine {
    #[serde(default)]
    pub description: String,
    pub hours: f64,
    pub hourly_rate_cents: i64,
}

/// A flat per-batch cost (rent share, utilities, packaging run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverheadLine {
    #[serde(default)]
    pub description: String,
    pub amount_cents: i64,
}

/// How the selling price is derived from the unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PricingStrategy {
    /// No price suggestion.
    #[default]
    None,
    /// price = cost + cost × rate
    Markup(Rate),
    /// price = cost / (1 − rate)
    TargetMargin(Rate),
    /// Price set by hand, in cents.
    FixedPrice(i64),
}

/// A priced recipe for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostSheet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Units one batch yields.
    pub batch_size: f64,
    #[serde(default)]
    pub materials: Vec<CostSheetMaterial>,
    #[serde(default)]
    pub labor: Vec<LaborLine>,
    #[serde(default)]
    pub overhead: Vec<OverheadLine>,
    #[serde(default)]
    pub pricing: PricingStrategy,
}

/// Computed totals of a cost sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CostSheetTotals {
    pub materials_cents: i64,
    pub labor_cents: i64,
    pub overhead_cents: i64,
    pub total_cents: i64,
    /// `None` when the batch size is not positive.
    pub unit_cost_cents: Option<i64>,
    /// `None` without a pricing strategy or without a unit cost.
    pub unit_price_cents: Option<i64>,
    /// Realized margin of the unit price, in basis points.
    pub margin_bps: Option<i64>,
    pub has_cycle: bool,
    pub unresolved: bool,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the totals and suggested price of a cost sheet.
///
/// ## Errors
/// [`CoreError::InvalidMargin`] when a target margin is 100% or more.
/// Missing references are not errors; they set `unresolved`.
pub fn compute_cost_sheet(
    sheet: &CostSheet,
    materials: &MaterialIndex,
    bom_costs: &BomCostMap,
) -> CoreResult<CostSheetTotals> {
    let mut has_cycle = false;
    let mut unresolved = false;

    let mut materials_total = Money::zero();
    for row in &sheet.materials {
        let fallback = Money::from_cents(row.unit_cost_cents);
        let unit_cost = match &row.component {
            Component::Material {
                material_id: Some(id),
            } => match materials.get(id) {
                Some(material) => material.unit_cost(),
                None => {
                    unresolved = true;
                    fallback
                }
            },
            Component::Material { material_id: None } => fallback,
            Component::Subassembly { bom_id: Some(id) } => match bom_costs.get(id) {
                Some(summary) => {
                    has_cycle |= summary.has_cycle;
                    unresolved |= summary.unresolved;
                    summary.unit_cost().unwrap_or_default()
                }
                None => {
                    unresolved = true;
                    fallback
                }
            },
            Component::Subassembly { bom_id: None } => {
                unresolved = true;
                fallback
            }
        };
        materials_total += unit_cost.scale(non_negative_quantity(row.quantity));
    }

    let labor_total: Money = sheet
        .labor
        .iter()
        .map(|l| Money::from_cents(l.hourly_rate_cents).scale(non_negative_quantity(l.hours)))
        .sum();

    let overhead_total: Money = sheet
        .overhead
        .iter()
        .map(|o| Money::from_cents(o.amount_cents).non_negative())
        .sum();

    let materials_total = materials_total.non_negative();
    let labor_total = labor_total.non_negative();
    let total = materials_total + labor_total + overhead_total;
    let unit_cost = total.per_unit(sheet.batch_size);

    let unit_price = match unit_cost {
        Some(cost) => price_for(cost, sheet.pricing)?,
        None => None,
    };

    let margin_bps = match (unit_cost, unit_price) {
        (Some(cost), Some(price)) => realized_margin_bps(cost, price),
        _ => None,
    };

    debug!(
        sheet_id = %sheet.id,
        total = total.cents(),
        unit_cost = ?unit_cost.map(|m| m.cents()),
        unit_price = ?unit_price.map(|m| m.cents()),
        "Cost sheet computed"
    );

    Ok(CostSheetTotals {
        materials_cents: materials_total.cents(),
        labor_cents: labor_total.cents(),
        overhead_cents: overhead_total.cents(),
        total_cents: total.cents(),
        unit_cost_cents: unit_cost.map(|m| m.cents()),
        unit_price_cents: unit_price.map(|m| m.cents()),
        margin_bps,
        has_cycle,
        unresolved,
    })
}

/// Applies a pricing strategy to a unit cost.
pub fn price_for(unit_cost: Money, pricing: PricingStrategy) -> CoreResult<Option<Money>> {
    match pricing {
        PricingStrategy::None => Ok(None),
        PricingStrategy::Markup(rate) => Ok(Some(unit_cost + unit_cost.apply_rate(rate))),
        PricingStrategy::TargetMargin(rate) => {
            if rate.bps() >= FULL_RATE_BPS {
                return Err(CoreError::InvalidMargin { bps: rate.bps() });
            }
            let kept = (FULL_RATE_BPS - rate.bps()) as f64;
            let price = unit_cost.cents() as f64 * FULL_RATE_BPS as f64 / kept;
            Ok(Some(Money::from_cents(Money::round_cents(price))))
        }
        PricingStrategy::FixedPrice(cents) => Ok(Some(Money::from_cents(cents))),
    }
}

/// Margin of `price` over `cost` in basis points, `None` for a zero price.
pub fn realized_margin_bps(cost: Money, price: Money) -> Option<i64> {
    if price.is_zero() {
        return None;
    }
    let profit = (price - cost).cents() as f64;
    Some(Money::round_cents(
        profit * FULL_RATE_BPS as f64 / price.cents() as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::compute_bom_cost_map;
    use crate::types::{index_materials, BomLine, BomRecord, Material};

    fn sourdough(pricing: PricingStrategy) -> CostSheet {
        CostSheet {
            id: "sourdough".to_string(),
            name: "Sourdough".to_string(),
            batch_size: 12.0,
            materials: vec![
                CostSheetMaterial {
                    component: Component::material("flour"),
                    quantity: 6.0,
                    unit_cost_cents: 0,
                },
                CostSheetMaterial {
                    component: Component::subassembly("starter"),
                    quantity: 1.0,
                    unit_cost_cents: 0,
                },
            ],
            labor: vec![LaborLine {
                description: "Mix, shape, bake".to_string(),
                hours: 2.5,
                hourly_rate_cents: 1800,
            }],
            overhead: vec![OverheadLine {
                description: "Oven gas".to_string(),
                amount_cents: 300,
            }],
            pricing,
        }
    }

    fn fixtures() -> (MaterialIndex, BomCostMap) {
        let flour = Material::new("Flour", 240).with_id("flour");
        let materials = index_materials([&flour]);
        let starter = BomRecord::new("Starter", 2.0)
            .with_id("starter")
            .with_line(BomLine::material("flour", 2.5));
        let costs = compute_bom_cost_map(&[starter], &materials);
        (materials, costs)
    }

    #[test]
    fn test_totals() {
        let (materials, costs) = fixtures();
        let totals = compute_cost_sheet(&sourdough(PricingStrategy::None), &materials, &costs)
            .unwrap();

        // flour 6 × 240 = 1440, starter 600 / 2 = 300 per unit
        assert_eq!(totals.materials_cents, 1740);
        assert_eq!(totals.labor_cents, 4500);
        assert_eq!(totals.overhead_cents, 300);
        assert_eq!(totals.total_cents, 6540);
        assert_eq!(totals.unit_cost_cents, Some(545));
        assert_eq!(totals.unit_price_cents, None);
        assert_eq!(totals.margin_bps, None);
        assert!(!totals.unresolved);
    }

    #[test]
    fn test_markup_pricing() {
        let (materials, costs) = fixtures();
        let sheet = sourdough(PricingStrategy::Markup(Rate::from_bps(5000)));
        let totals = compute_cost_sheet(&sheet, &materials, &costs).unwrap();

        // 545 + round_half_up(272.5) = 818
        assert_eq!(totals.unit_price_cents, Some(818));
        assert_eq!(totals.margin_bps, Some(3337));
    }

    #[test]
    fn test_target_margin_pricing() {
        let (materials, costs) = fixtures();
        let sheet = sourdough(PricingStrategy::TargetMargin(Rate::from_bps(4000)));
        let totals = compute_cost_sheet(&sheet, &materials, &costs).unwrap();

        // 545 / 0.6 = 908.33
        assert_eq!(totals.unit_price_cents, Some(908));
        assert_eq!(totals.margin_bps, Some(3998));
    }

    #[test]
    fn test_full_margin_is_rejected() {
        let (materials, costs) = fixtures();
        let sheet = sourdough(PricingStrategy::TargetMargin(Rate::from_bps(10_000)));

        let err = compute_cost_sheet(&sheet, &materials, &costs).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMargin { bps: 10_000 }));
    }

    #[test]
    fn test_fixed_price_below_cost_has_negative_margin() {
        let price = Money::from_cents(500);
        let cost = Money::from_cents(600);
        assert_eq!(realized_margin_bps(cost, price), Some(-2000));
        assert_eq!(realized_margin_bps(cost, Money::zero()), None);
    }

    #[test]
    fn test_missing_references_flagged() {
        let sheet = sourdough(PricingStrategy::None);
        let totals = compute_cost_sheet(&sheet, &MaterialIndex::new(), &BomCostMap::new())
            .unwrap();

        assert!(totals.unresolved);
        assert_eq!(totals.materials_cents, 0);
    }

    #[test]
    fn test_zero_batch_size_has_no_unit_cost_or_price() {
        let (materials, costs) = fixtures();
        let mut sheet = sourdough(PricingStrategy::FixedPrice(999));
        sheet.batch_size = 0.0;

        let totals = compute_cost_sheet(&sheet, &materials, &costs).unwrap();
        assert_eq!(totals.unit_cost_cents, None);
        assert_eq!(totals.unit_price_cents, None);
        assert_eq!(totals.total_cents, 6540);
    }

    #[test]
    fn test_negative_overhead_ignored() {
        let (materials, costs) = fixtures();
        let mut sheet = sourdough(PricingStrategy::None);
        sheet.overhead.push(OverheadLine {
            description: "Typo".to_string(),
            amount_cents: -10_000,
        });

        let totals = compute_cost_sheet(&sheet, &materials, &costs).unwrap();
        assert_eq!(totals.overhead_cents, 300);
    }

    #[test]
    fn test_huge_hours_saturate_totals() {
        let (materials, costs) = fixtures();
        let mut sheet = sourdough(PricingStrategy::Markup(Rate::from_bps(5000)));
        sheet.labor[0].hours = 1e300;
        sheet.labor.push(sheet.labor[0].clone());

        let totals = compute_cost_sheet(&sheet, &materials, &costs).unwrap();
        assert_eq!(totals.labor_cents, i64::MAX);
        assert_eq!(totals.total_cents, i64::MAX);
        assert!(totals.unit_price_cents.is_some());
    }

    #[test]
    fn test_pricing_json_shape() {
        let json = serde_json::to_value(PricingStrategy::Markup(Rate::from_bps(2500))).unwrap();
        assert_eq!(json["kind"], "markup");
        assert_eq!(json["value"], 2500);
    }
}
