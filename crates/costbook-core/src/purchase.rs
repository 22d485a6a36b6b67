//! # Purchase-Derived Material Costs
//!
//! Material unit costs usually come from what was actually paid. This module
//! turns purchase records into unit costs the catalog (and therefore the BOM
//! resolver) can use.
//!
//! ```text
//! Purchases of Flour
//!   2024-01-03   10 kg   $24.00
//!   2024-02-11   25 kg   $55.00
//!
//! Latest          → 5500 / 25        = 220¢ per kg
//! WeightedAverage → 7900 / 35 = 225.7 → 226¢ per kg
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tracing::debug;

use crate::money::Money;
use crate::types::Material;

// =============================================================================
// Purchase Record
// =============================================================================

/// One purchase of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    #[serde(default)]
    pub id: String,

    pub material_id: String,

    /// Units bought, in the material's unit of measure.
    pub quantity: f64,

    /// What was paid for the whole purchase, in cents.
    pub total_cost_cents: i64,

    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Cost per unit of this purchase.
    ///
    /// `None` when the quantity is not a positive finite number or the total
    /// is negative; such records carry no usable price.
    pub fn unit_cost_cents(&self) -> Option<i64> {
        if !self.is_usable() {
            return None;
        }
        Money::from_cents(self.total_cost_cents)
            .per_unit(self.quantity)
            .map(|m| m.cents())
    }

    fn is_usable(&self) -> bool {
        self.quantity.is_finite() && self.quantity > 0.0 && self.total_cost_cents >= 0
    }
}

// =============================================================================
// Cost Method
// =============================================================================

/// How several purchases combine into one unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CostMethod {
    /// Price of the most recent purchase.
    #[default]
    Latest,
    /// Total paid divided by total quantity.
    WeightedAverage,
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostMethod::Latest => write!(f, "latest"),
            CostMethod::WeightedAverage => write!(f, "weighted_average"),
        }
    }
}

impl std::str::FromStr for CostMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "latest" | "last" => Ok(CostMethod::Latest),
            "weighted_average" | "average" | "avg" => Ok(CostMethod::WeightedAverage),
            other => Err(format!(
                "Unknown cost method: '{}'. Valid options: latest, weighted_average",
                other
            )),
        }
    }
}

// =============================================================================
// Derivation
// =============================================================================

/// Combines purchases of one material into a unit cost.
///
/// Unusable records (see [`PurchaseRecord::unit_cost_cents`]) are skipped.
/// Returns `None` when nothing usable remains.
pub fn unit_cost_from_purchases<'a>(
    purchases: impl IntoIterator<Item = &'a PurchaseRecord>,
    method: CostMethod,
) -> Option<i64> {
    let usable = purchases.into_iter().filter(|p| p.is_usable());

    match method {
        CostMethod::Latest => usable
            .max_by_key(|p| p.purchased_at)
            .and_then(PurchaseRecord::unit_cost_cents),
        CostMethod::WeightedAverage => {
            let (paid, qty) = usable.fold((0i64, 0f64), |(paid, qty), p| {
                (paid.saturating_add(p.total_cost_cents), qty + p.quantity)
            });
            Money::from_cents(paid).per_unit(qty).map(|m| m.cents())
        }
    }
}

/// Returns copies of `materials` re-costed from `purchases`.
///
/// Materials without usable purchases keep their current unit cost.
pub fn apply_purchase_costs(
    materials: &[Material],
    purchases: &[PurchaseRecord],
    method: CostMethod,
) -> Vec<Material> {
    let mut by_material: HashMap<&str, Vec<&PurchaseRecord>> = HashMap::new();
    for purchase in purchases {
        by_material
            .entry(purchase.material_id.as_str())
            .or_default()
            .push(purchase);
    }

    materials
        .iter()
        .map(|material| {
            let mut updated = material.clone();
            let derived = by_material
                .get(material.id.as_str())
                .and_then(|records| unit_cost_from_purchases(records.iter().copied(), method));

            if let Some(cents) = derived {
                debug!(
                    material_id = %material.id,
                    old = material.unit_cost_cents,
                    new = cents,
                    %method,
                    "Material re-costed from purchases"
                );
                updated.unit_cost_cents = cents;
            }
            updated
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn purchase(day: u32, quantity: f64, total_cost_cents: i64) -> PurchaseRecord {
        PurchaseRecord {
            id: format!("P{day}"),
            material_id: "flour".to_string(),
            quantity,
            total_cost_cents,
            purchased_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_unit_cost_of_one_purchase() {
        assert_eq!(purchase(1, 10.0, 2400).unit_cost_cents(), Some(240));
        assert_eq!(purchase(1, 0.0, 2400).unit_cost_cents(), None);
        assert_eq!(purchase(1, f64::NAN, 2400).unit_cost_cents(), None);
        assert_eq!(purchase(1, 5.0, -100).unit_cost_cents(), None);
    }

    #[test]
    fn test_latest_picks_most_recent_regardless_of_order() {
        let records = vec![purchase(20, 25.0, 5500), purchase(3, 10.0, 2400)];
        assert_eq!(
            unit_cost_from_purchases(&records, CostMethod::Latest),
            Some(220)
        );
    }

    #[test]
    fn test_latest_skips_unusable_newer_record() {
        let records = vec![purchase(3, 10.0, 2400), purchase(20, 0.0, 5500)];
        assert_eq!(
            unit_cost_from_purchases(&records, CostMethod::Latest),
            Some(240)
        );
    }

    #[test]
    fn test_weighted_average() {
        let records = vec![purchase(3, 10.0, 2400), purchase(20, 25.0, 5500)];
        // 7900 / 35 = 225.71
        assert_eq!(
            unit_cost_from_purchases(&records, CostMethod::WeightedAverage),
            Some(226)
        );
    }

    #[test]
    fn test_no_usable_purchases() {
        let records = vec![purchase(3, -1.0, 2400)];
        assert_eq!(unit_cost_from_purchases(&records, CostMethod::Latest), None);
        assert_eq!(
            unit_cost_from_purchases(&records, CostMethod::WeightedAverage),
            None
        );
    }

    #[test]
    fn test_apply_purchase_costs() {
        let flour = Material::new("Flour", 999).with_id("flour");
        let sugar = Material::new("Sugar", 180).with_id("sugar");
        let records = vec![purchase(3, 10.0, 2400)];

        let updated = apply_purchase_costs(&[flour, sugar], &records, CostMethod::Latest);
        assert_eq!(updated[0].unit_cost_cents, 240);
        assert_eq!(updated[1].unit_cost_cents, 180);
    }

    #[test]
    fn test_cost_method_parsing() {
        assert_eq!("latest".parse::<CostMethod>().unwrap(), CostMethod::Latest);
        assert_eq!(
            "weighted-average".parse::<CostMethod>().unwrap(),
            CostMethod::WeightedAverage
        );
        assert_eq!("AVG".parse::<CostMethod>().unwrap(), CostMethod::WeightedAverage);
        assert!("fifo".parse::<CostMethod>().is_err());
    }
}
