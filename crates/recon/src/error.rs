use std::fmt;

#[derive(Debug)]
pub enum AuditError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad period, bad threshold, etc.).
    ConfigValidation(String),
    /// A target count below zero — targets are reference totals and can
    /// never be negative.
    InvalidTarget { employee_id: String, value: i64 },
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// CSV read error.
    Csv(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidTarget { employee_id, value } => {
                write!(f, "employee '{employee_id}': negative target {value}")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for AuditError {}
