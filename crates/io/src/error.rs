use std::fmt;

use ffbaudit_recon::AuditError;

#[derive(Debug)]
pub enum IngestError {
    /// File read error.
    Io(String),
    /// Input is not recognizable isql table output.
    NotATable(String),
    /// CSV read error.
    Csv(String),
    /// Missing required column in a lookup file.
    MissingColumn { file_kind: String, column: String },
    /// Non-numeric or negative reference target.
    BadTarget { employee_id: String, value: String },
    /// Error bubbled up from the engine's column resolution.
    Audit(AuditError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::NotATable(msg) => write!(f, "not isql table output: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingColumn { file_kind, column } => {
                write!(f, "{file_kind}: missing column '{column}'")
            }
            Self::BadTarget { employee_id, value } => {
                write!(f, "employee '{employee_id}': bad target value '{value}'")
            }
            Self::Audit(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<AuditError> for IngestError {
    fn from(err: AuditError) -> Self {
        Self::Audit(err)
    }
}
