//! # costbook-report: Costing Report
//!
//! Loads a materials/BOM snapshot, rolls up every BOM's cost with
//! costbook-core, and prints the result with its warnings.
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        costbook-report                                  │
//! │                                                                         │
//! │  main.rs ────► run()                                                    │
//! │                  │                                                      │
//! │                  ├─ 1. ReportConfig::load()    file + environment       │
//! │                  ├─ 2. Cli::apply_to()          flags win               │
//! │                  ├─ 3. init_tracing()           RUST_LOG or config      │
//! │                  ├─ 4. Snapshot::load()         JSON → records          │
//! │                  ├─ 5. apply_purchase_costs()   if cost_method is set   │
//! │                  ├─ 6. CostingState::bom_costs() resolver, cached       │
//! │                  ├─ 7. compute_cost_sheet()     per cost sheet          │
//! │                  └─ 8. render_table() / render_json() → stdout          │
//! │                                                                         │
//! │  Broken references and cycles never fail the run; they are printed      │
//! │  as warnings next to the affected BOM.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - TOML + environment configuration
//! - [`cli`] - Command-line flags
//! - [`snapshot`] - Snapshot loading and save-time validation
//! - [`state`] - Materials/BOMs with a cached cost map
//! - [`render`] - Table and JSON output
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Report error types

pub mod cli;
pub mod config;
pub mod error;
pub mod render;
pub mod snapshot;
pub mod state;
pub mod telemetry;

use clap::Parser;
use costbook_core::{apply_purchase_costs, compute_cost_sheet};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::{OutputFormat, OutputSettings, ReportConfig};
use crate::error::{ReportError, ReportResult};
use crate::render::{render_json, render_table, BomCostReport, CostSheetRow};
use crate::snapshot::Snapshot;
use crate::state::CostingState;

/// Parses the command line and prints the report.
pub fn run() -> ReportResult<()> {
    run_with(Cli::parse())
}

/// Prints the report for already-parsed flags.
pub fn run_with(cli: Cli) -> ReportResult<()> {
    let mut config = ReportConfig::load(cli.config.clone())?;
    cli.apply_to(&mut config);
    config.validate()?;

    telemetry::init_tracing(&config.logging.filter);
    info!(format = %config.output.format, "Starting costbook report");

    let output = generate(&config, &cli.boms)?;
    println!("{}", output.trim_end());
    Ok(())
}

/// Loads the configured snapshot and renders the report as text.
pub fn generate(config: &ReportConfig, selected: &[String]) -> ReportResult<String> {
    let path = config
        .snapshot
        .path
        .as_deref()
        .ok_or(ReportError::MissingSnapshot)?;
    let snapshot = Snapshot::load(path)?;
    let report = build_report(snapshot, &config.output, selected)?;

    match config.output.format {
        OutputFormat::Table => Ok(render_table(&report, config.output.show_warnings)),
        OutputFormat::Json => render_json(&report),
    }
}

/// Costs every BOM and cost sheet in a snapshot.
pub fn build_report(
    snapshot: Snapshot,
    output: &OutputSettings,
    selected: &[String],
) -> ReportResult<BomCostReport> {
    let findings = snapshot.log_findings();
    if findings > 0 {
        warn!(findings, "Snapshot has records that would fail validation");
    }

    let Snapshot {
        materials,
        boms,
        purchases,
        cost_sheets,
    } = snapshot;

    let materials = match output.cost_method {
        Some(method) => apply_purchase_costs(&materials, &purchases, method),
        None => materials,
    };

    let state = CostingState::with_records(materials, boms.clone());
    let costs = state.bom_costs();
    let report = BomCostReport::build(&boms, &costs, selected)?;

    let mut sheet_rows = Vec::with_capacity(cost_sheets.len());
    for sheet in &cost_sheets {
        match state.with_materials(|materials| compute_cost_sheet(sheet, materials, &costs)) {
            Ok(totals) => sheet_rows.push(CostSheetRow {
                id: sheet.id.clone(),
                name: sheet.name.clone(),
                totals,
            }),
            Err(e) => warn!(cost_sheet_id = %sheet.id, error = %e, "Skipping cost sheet"),
        }
    }

    let report = report.with_cost_sheets(sheet_rows);
    info!(
        boms = report.boms.len(),
        flagged = report.flagged_count(),
        cost_sheets = report.cost_sheets.len(),
        "Report built"
    );
    Ok(report)
}
