//! # Report Configuration
//!
//! Configuration management for the costing report.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --snapshot ./boms.json --format json                               │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     COSTBOOK_SNAPSHOT=./boms.json                                      │
//! │     COSTBOOK_FORMAT=json                                               │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/costbook/report.toml (Linux)                             │
//! │     ~/Library/Application Support/com.costbook.costbook/report.toml    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     table output, warnings shown, stored material costs                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # report.toml
//! [snapshot]
//! path = "/home/maria/costbook/export.json"
//!
//! [output]
//! format = "table"          # table | json
//! show_warnings = true
//! cost_method = "latest"    # latest | weighted_average (omit to keep stored costs)
//!
//! [logging]
//! filter = "info,costbook=debug"
//! ```

use std::fmt;
use std::path::PathBuf;

use costbook_core::CostMethod;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ReportError, ReportResult};

// =============================================================================
// Output Format
// =============================================================================

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned text table for a terminal.
    #[default]
    Table,
    /// Pretty-printed JSON for other tools.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::InvalidConfig(format!(
                "Unknown output format: '{}'. Valid options: table, json",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Where the materials/BOM snapshot comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Path to the snapshot JSON document.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print "Circular reference detected" etc. next to flagged BOMs.
    #[serde(default = "default_true")]
    pub show_warnings: bool,

    /// Re-cost materials from purchase records before resolving.
    /// `None` keeps the unit costs stored on the materials.
    #[serde(default)]
    pub cost_method: Option<CostMethod>,
}

fn default_true() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            format: OutputFormat::default(),
            show_warnings: true,
            cost_method: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` still wins.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info,costbook=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Main Report Configuration
// =============================================================================

/// Complete report configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub snapshot: SnapshotSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl ReportConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (report.toml)
    /// 3. Environment variables
    ///
    /// Runs before the subscriber is installed, so its own log lines only
    /// show up when a subscriber already exists (e.g. in tests).
    pub fn load(config_path: Option<PathBuf>) -> ReportResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading report config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> ReportResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ReportResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        if let Some(path) = &self.snapshot.path {
            if path.as_os_str().is_empty() {
                return Err(ReportError::InvalidConfig(
                    "snapshot.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("COSTBOOK_SNAPSHOT") {
            debug!(path = %path, "Overriding snapshot path from environment");
            self.snapshot.path = Some(PathBuf::from(path));
        }

        if let Some(format) = lookup("COSTBOOK_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.output.format = parsed,
                Err(_) => warn!(format = %format, "Unknown output format in environment"),
            }
        }

        if let Some(method) = lookup("COSTBOOK_COST_METHOD") {
            match method.parse() {
                Ok(parsed) => self.output.cost_method = Some(parsed),
                Err(_) => warn!(method = %method, "Unknown cost method in environment"),
            }
        }

        if let Some(flag) = lookup("COSTBOOK_SHOW_WARNINGS") {
            if let Ok(show) = flag.parse::<bool>() {
                self.output.show_warnings = show;
            }
        }

        if let Some(filter) = lookup("COSTBOOK_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "costbook", "costbook")
            .map(|dirs| dirs.config_dir().join("report.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(config.output.show_warnings);
        assert!(config.output.cost_method.is_none());
        assert!(config.snapshot.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReportConfig::from_toml(
            r#"
            [output]
            format = "json"
            cost_method = "weighted_average"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.cost_method, Some(CostMethod::WeightedAverage));
        assert!(config.output.show_warnings);
        assert_eq!(config.logging.filter, "info,costbook=debug");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("COSTBOOK_SNAPSHOT", "/data/export.json"),
            ("COSTBOOK_FORMAT", "json"),
            ("COSTBOOK_COST_METHOD", "bogus"),
            ("COSTBOOK_SHOW_WARNINGS", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = ReportConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.snapshot.path,
            Some(PathBuf::from("/data/export.json"))
        );
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.cost_method.is_none());
        assert!(!config.output.show_warnings);
    }

    #[test]
    fn test_validation() {
        let mut config = ReportConfig::default();
        config.logging.filter = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.snapshot.path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[snapshot]\npath = \"boms.json\"").unwrap();

        let config = ReportConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert!(config.snapshot.path.is_some());
    }

    #[test]
    fn test_invalid_toml_fails() {
        let err = ReportConfig::from_toml("[output\nformat = ").unwrap_err();
        assert!(matches!(err, ReportError::ConfigLoadFailed(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ReportConfig::default();
        config.output.cost_method = Some(CostMethod::Latest);

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = ReportConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.output.cost_method, Some(CostMethod::Latest));
    }
}
