use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AuditError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    pub name: String,
    pub period: PeriodConfig,
    pub source: SourceConfig,
    /// Division id → display name. When empty, the division set is derived
    /// from the data and ids double as names.
    #[serde(default)]
    pub divisions: BTreeMap<String, DivisionConfig>,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub directory: Option<FileRef>,
    #[serde(default)]
    pub division_map: Option<FileRef>,
    #[serde(default)]
    pub targets: Option<TargetsConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Reporting period: inclusive start, exclusive end. Callers pass the
/// first day of the next period as `end`, never the last day of the
/// current one.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    #[serde(default = "default_format")]
    pub format: SourceFormat,
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    Isql,
}

fn default_format() -> SourceFormat {
    SourceFormat::Csv
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Isql => write!(f, "isql"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub employee_id: String,
    pub role_tag: String,
    pub transaction_no: String,
    pub date: String,
    /// Field/block column; joined through the division map.
    pub field: String,
    pub status: String,
    pub counts: CountColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountColumns {
    pub ripe: String,
    pub unripe: String,
    pub black: String,
    pub rotten: String,
    pub long_stalk: String,
    pub rat_damaged: String,
    pub loose_fruit: String,
}

impl CountColumns {
    /// Raw column names in `BunchCounts::FIELD_NAMES` order.
    pub fn as_array(&self) -> [&str; 7] {
        [
            &self.ripe,
            &self.unripe,
            &self.black,
            &self.rotten,
            &self.long_stalk,
            &self.rat_damaged,
            &self.loose_fruit,
        ]
    }
}

// ---------------------------------------------------------------------------
// Divisions + options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DivisionConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// When set, only scans whose status equals `confirmed_status` qualify
    /// as verifier candidates. Verification itself is always pairing-based;
    /// this is the optional extra filter some report variants apply.
    pub require_confirmed_status: bool,
    pub confirmed_status: i64,
    /// Percent threshold for CI-style exit codes; divisions below it fail
    /// the run.
    pub min_verification_rate: Option<f64>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            require_confirmed_status: false,
            confirmed_status: 724,
            min_verification_rate: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup files + targets + output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetsConfig {
    /// CSV of `employee_id,target` reference totals.
    pub file: String,
    /// Division that absorbs the full target when an employee has no
    /// nonzero divisional count anywhere.
    #[serde(default)]
    pub fallback_division: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, AuditError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| AuditError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.period.end <= self.period.start {
            return Err(AuditError::ConfigValidation(format!(
                "period end {} must be after start {} (end is exclusive)",
                self.period.end, self.period.start
            )));
        }

        if let Some(rate) = self.options.min_verification_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(AuditError::ConfigValidation(format!(
                    "min_verification_rate must be within 0..=100, got {rate}"
                )));
            }
        }

        if let Some(ref targets) = self.targets {
            if let Some(ref fallback) = targets.fallback_division {
                if !self.divisions.is_empty() && !self.divisions.contains_key(fallback) {
                    return Err(AuditError::ConfigValidation(format!(
                        "fallback_division '{fallback}' is not a configured division"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Display name for a division, falling back to the id.
    pub fn division_name(&self, division_id: &str) -> String {
        match self.divisions.get(division_id) {
            Some(division) => division.name.clone(),
            None => division_id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
