//! # Report Rendering
//!
//! Builds the [`BomCostReport`] from a cost map and prints it.
//!
//! ## Table Layout
//! ```text
//! ID     NAME    TOTAL    UNIT  WARNINGS
//! bread  Bread  $20.00  $10.00
//! loop   Loop    $0.00   $0.00  Circular reference detected; Incomplete component links
//! tray   Tray    $2.50       -
//! ```

use chrono::{DateTime, Utc};
use costbook_core::{
    summary_for, BomCostMap, BomRecord, BomWarning, CoreResult, CostSheetTotals, Money,
};
use serde::Serialize;

use crate::error::ReportResult;

/// Placeholder for a unit cost or price that does not exist.
const NONE_CELL: &str = "-";

// =============================================================================
// Report Types
// =============================================================================

/// One BOM's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomReportRow {
    pub id: String,
    pub name: String,
    pub total_cost_cents: i64,
    pub unit_cost_cents: Option<i64>,
    pub has_cycle: bool,
    pub unresolved: bool,
    pub warnings: Vec<BomWarning>,
}

/// One cost sheet's line in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSheetRow {
    pub id: String,
    pub name: String,
    pub totals: CostSheetTotals,
}

/// Everything printed by one report run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomCostReport {
    pub generated_at: DateTime<Utc>,
    pub boms: Vec<BomReportRow>,
    pub cost_sheets: Vec<CostSheetRow>,
}

impl BomCostReport {
    /// Builds the BOM rows, ordered by id.
    ///
    /// An empty `selected` reports every BOM. Selecting an id that is not
    /// in the cost map fails with `CoreError::BomNotFound`.
    pub fn build(
        boms: &[BomRecord],
        costs: &BomCostMap,
        selected: &[String],
    ) -> CoreResult<Self> {
        let mut ids: Vec<&str> = if selected.is_empty() {
            costs.keys().map(String::as_str).collect()
        } else {
            selected.iter().map(String::as_str).collect()
        };
        ids.sort_unstable();
        ids.dedup();

        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let summary = summary_for(costs, id)?;
            // Same record the resolver used when ids repeat.
            let name = boms
                .iter()
                .rev()
                .find(|bom| bom.id == id)
                .map(|bom| bom.name.clone())
                .unwrap_or_default();

            rows.push(BomReportRow {
                id: id.to_string(),
                name,
                total_cost_cents: summary.total_cost_cents,
                unit_cost_cents: summary.unit_cost_cents,
                has_cycle: summary.has_cycle,
                unresolved: summary.unresolved,
                warnings: summary.warnings(),
            });
        }

        Ok(BomCostReport {
            generated_at: Utc::now(),
            boms: rows,
            cost_sheets: Vec::new(),
        })
    }

    /// Attaches cost sheet totals.
    pub fn with_cost_sheets(mut self, cost_sheets: Vec<CostSheetRow>) -> Self {
        self.cost_sheets = cost_sheets;
        self
    }

    /// Number of BOMs carrying at least one warning.
    pub fn flagged_count(&self) -> usize {
        self.boms.iter().filter(|row| !row.warnings.is_empty()).count()
    }
}

// =============================================================================
// Output
// =============================================================================

fn money_cell(cents: Option<i64>) -> String {
    cents
        .map(|c| Money::from_cents(c).to_string())
        .unwrap_or_else(|| NONE_CELL.to_string())
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(|c| c.chars().count()).fold(header.len(), usize::max)
}

/// Renders the report as aligned text.
pub fn render_table(report: &BomCostReport, show_warnings: bool) -> String {
    let mut out = String::new();

    let totals: Vec<String> = report
        .boms
        .iter()
        .map(|row| money_cell(Some(row.total_cost_cents)))
        .collect();
    let units: Vec<String> = report
        .boms
        .iter()
        .map(|row| money_cell(row.unit_cost_cents))
        .collect();

    let id_w = column_width("ID", report.boms.iter().map(|r| r.id.as_str()));
    let name_w = column_width("NAME", report.boms.iter().map(|r| r.name.as_str()));
    let total_w = column_width("TOTAL", totals.iter().map(String::as_str));
    let unit_w = column_width("UNIT", units.iter().map(String::as_str));

    let header = format!(
        "{:<id_w$}  {:<name_w$}  {:>total_w$}  {:>unit_w$}",
        "ID", "NAME", "TOTAL", "UNIT"
    );
    if show_warnings {
        out.push_str(&format!("{}  WARNINGS\n", header));
    } else {
        out.push_str(&format!("{}\n", header.trim_end()));
    }

    for ((row, total), unit) in report.boms.iter().zip(&totals).zip(&units) {
        let line = format!(
            "{:<id_w$}  {:<name_w$}  {:>total_w$}  {:>unit_w$}",
            row.id, row.name, total, unit
        );
        let warnings = row
            .warnings
            .iter()
            .map(BomWarning::message)
            .collect::<Vec<_>>()
            .join("; ");

        if show_warnings && !warnings.is_empty() {
            out.push_str(&format!("{}  {}\n", line, warnings));
        } else {
            out.push_str(&format!("{}\n", line.trim_end()));
        }
    }

    if !report.cost_sheets.is_empty() {
        out.push_str("\nCOST SHEETS\n");
        for sheet in &report.cost_sheets {
            let t = &sheet.totals;
            out.push_str(&format!(
                "{} ({}): total {} unit {} price {}\n",
                sheet.id,
                sheet.name,
                Money::from_cents(t.total_cents),
                money_cell(t.unit_cost_cents),
                money_cell(t.unit_price_cents),
            ));
        }
    }

    out
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &BomCostReport) -> ReportResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbook_core::{compute_bom_cost_map, index_materials, BomLine, CoreError, Material};

    fn fixture() -> (Vec<BomRecord>, BomCostMap) {
        let flour = Material::new("Flour", 250).with_id("M1");
        let boms = vec![
            BomRecord::new("Bread", 2.0)
                .with_id("bread")
                .with_line(BomLine::material("M1", 8.0)),
            BomRecord::new("Loop", 1.0)
                .with_id("loop")
                .with_line(BomLine::subassembly("loop", 1.0)),
            BomRecord::new("Tray", 0.0)
                .with_id("tray")
                .with_line(BomLine::material("M1", 1.0)),
        ];
        let costs = compute_bom_cost_map(&boms, &index_materials([&flour]));
        (boms, costs)
    }

    #[test]
    fn test_build_orders_rows_by_id() {
        let (boms, costs) = fixture();
        let report = BomCostReport::build(&boms, &costs, &[]).unwrap();

        let ids: Vec<&str> = report.boms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["bread", "loop", "tray"]);
        assert_eq!(report.boms[0].name, "Bread");
        assert_eq!(report.boms[0].total_cost_cents, 2000);
        assert_eq!(report.boms[0].unit_cost_cents, Some(1000));
        assert_eq!(report.flagged_count(), 1);
    }

    #[test]
    fn test_build_selected_ids() {
        let (boms, costs) = fixture();
        let selected = vec!["tray".to_string(), "tray".to_string()];
        let report = BomCostReport::build(&boms, &costs, &selected).unwrap();

        assert_eq!(report.boms.len(), 1);
        assert_eq!(report.boms[0].unit_cost_cents, None);
    }

    #[test]
    fn test_build_unknown_id_fails() {
        let (boms, costs) = fixture();
        let err = BomCostReport::build(&boms, &costs, &["cake".to_string()]).unwrap_err();
        assert!(matches!(err, CoreError::BomNotFound(id) if id == "cake"));
    }

    #[test]
    fn test_render_table() {
        let (boms, costs) = fixture();
        let report = BomCostReport::build(&boms, &costs, &[]).unwrap();
        let table = render_table(&report, true);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].ends_with("WARNINGS"));
        assert!(lines[1].contains("$20.00"));
        assert!(lines[1].contains("$10.00"));
        assert!(lines[2].contains("Circular reference detected; Incomplete component links"));
        assert!(lines[3].trim_end().ends_with(NONE_CELL));
    }

    #[test]
    fn test_render_table_without_warnings() {
        let (boms, costs) = fixture();
        let report = BomCostReport::build(&boms, &costs, &[]).unwrap();
        let table = render_table(&report, false);

        assert!(!table.contains("WARNINGS"));
        assert!(!table.contains("Circular"));
    }

    #[test]
    fn test_render_json_shape() {
        let (boms, costs) = fixture();
        let report = BomCostReport::build(&boms, &costs, &["loop".to_string()]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert!(json["generatedAt"].is_string());
        assert_eq!(json["boms"][0]["hasCycle"], true);
        assert_eq!(json["boms"][0]["unitCostCents"], 0);
        assert_eq!(json["boms"][0]["warnings"][0], "circular_reference");
        assert!(json["costSheets"].as_array().unwrap().is_empty());
    }
}
