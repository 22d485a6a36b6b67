//! # Command Line
//!
//! ```bash
//! # Every BOM as a table
//! costbook-report --snapshot export.json
//!
//! # Two BOMs as JSON, materials re-costed from their purchases
//! costbook-report --snapshot export.json --format json \
//!     --bom bread --bom cake --cost-method weighted-average
//! ```

use std::path::PathBuf;

use clap::Parser;
use costbook_core::CostMethod;

use crate::config::{OutputFormat, ReportConfig};

#[derive(Debug, Parser)]
#[command(name = "costbook-report")]
#[command(version)]
#[command(about = "Roll up BOM costs and print them with their warnings")]
#[command(long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config dir's report.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Snapshot JSON with materials, BOMs, purchases and cost sheets
    #[arg(long, short)]
    pub snapshot: Option<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum)]
    pub format: Option<OutputFormat>,

    /// Only report these BOM ids (repeatable)
    #[arg(long = "bom", short = 'b', value_name = "ID")]
    pub boms: Vec<String>,

    /// Re-cost materials from purchases: latest or weighted-average
    #[arg(long)]
    pub cost_method: Option<CostMethod>,

    /// Hide warning messages in table output
    #[arg(long)]
    pub no_warnings: bool,
}

impl Cli {
    /// Applies the flags on top of file and environment configuration.
    pub fn apply_to(&self, config: &mut ReportConfig) {
        if let Some(path) = &self.snapshot {
            config.snapshot.path = Some(path.clone());
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(method) = self.cost_method {
            config.output.cost_method = Some(method);
        }
        if self.no_warnings {
            config.output.show_warnings = false;
        }
    }
}
