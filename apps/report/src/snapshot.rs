//! # Snapshot Loading
//!
//! A snapshot is the in-memory data set the BOM store hands to the
//! resolver, written out as one JSON document:
//!
//! ```json
//! {
//!   "materials": [{ "id": "M1", "name": "Flour", "unitCostCents": 250 }],
//!   "boms": [{
//!     "id": "X", "name": "Bread", "outputQty": 2,
//!     "lines": [{ "component": { "componentType": "material", "materialId": "M1" }, "quantity": 3 }]
//!   }],
//!   "purchases": [],
//!   "costSheets": []
//! }
//! ```
//!
//! Validation findings are logged, never fatal: the resolver copes with
//! anything and flags what it could not resolve.

use std::path::Path;

use costbook_core::validation::{
    validate_bom_record, validate_cost_cents, validate_entity_id, validate_rate_bps,
};
use costbook_core::{
    BomRecord, CostSheet, Material, PricingStrategy, PurchaseRecord, ValidationError,
    MAX_MARKUP_BPS, MAX_TARGET_MARGIN_BPS,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ReportError, ReportResult};

/// Materials, BOMs and their supporting records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub boms: Vec<BomRecord>,

    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,

    #[serde(default)]
    pub cost_sheets: Vec<CostSheet>,
}

/// A validation finding tied to the record it came from.
#[derive(Debug)]
pub struct Finding {
    pub entity: &'static str,
    pub id: String,
    pub error: ValidationError,
}

impl Snapshot {
    /// Reads and parses a snapshot file.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ReportError::snapshot(path, e))?;
        let snapshot = Self::from_json(&contents).map_err(|e| ReportError::snapshot(path, e))?;

        info!(
            path = %path.display(),
            materials = snapshot.materials.len(),
            boms = snapshot.boms.len(),
            purchases = snapshot.purchases.len(),
            cost_sheets = snapshot.cost_sheets.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Parses a snapshot document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Runs the save-time checks over every record.
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for material in &self.materials {
            let checks = [
                validate_entity_id(&material.id),
                validate_cost_cents(material.unit_cost_cents),
            ];
            for error in checks.into_iter().filter_map(Result::err) {
                findings.push(Finding {
                    entity: "material",
                    id: material.id.clone(),
                    error,
                });
            }
        }

        for bom in &self.boms {
            for error in validate_bom_record(bom) {
                findings.push(Finding {
                    entity: "bom",
                    id: bom.id.clone(),
                    error,
                });
            }
        }

        for sheet in &self.cost_sheets {
            let rate_check = match sheet.pricing {
                PricingStrategy::Markup(rate) => validate_rate_bps(rate.bps(), MAX_MARKUP_BPS),
                PricingStrategy::TargetMargin(rate) => {
                    validate_rate_bps(rate.bps(), MAX_TARGET_MARGIN_BPS)
                }
                PricingStrategy::FixedPrice(cents) => validate_cost_cents(cents),
                PricingStrategy::None => Ok(()),
            };
            if let Err(error) = rate_check {
                findings.push(Finding {
                    entity: "cost sheet",
                    id: sheet.id.clone(),
                    error,
                });
            }
        }

        findings
    }

    /// Validates and logs each finding as a warning. Returns how many there were.
    pub fn log_findings(&self) -> usize {
        let findings = self.validate();
        for finding in &findings {
            warn!(
                entity = finding.entity,
                id = %finding.id,
                "{}",
                finding.error
            );
        }
        findings.len()
    }
}
