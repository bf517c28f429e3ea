use serde::Serialize;

/// Scanner role, decoded from the raw record tag once at the engine
/// boundary. Everything downstream matches on this enum; raw tags are
/// never re-inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Data entry: creates the original transaction record.
    Kerani,
    /// Supervisor: independently re-scans a transaction.
    Mandor,
    /// Assistant: alternative independent confirmation.
    Asisten,
    /// Unrecognized tag. Rows with this role are skipped, never fatal;
    /// stray tags (e.g. "XX") occur in production data.
    Unknown,
}

impl Role {
    /// Map a raw record tag to a role. Total: any tag outside the three
    /// known scanner codes yields `Unknown`.
    pub fn classify(tag: &str) -> Role {
        match tag.trim().to_ascii_uppercase().as_str() {
            "KR" => Role::Kerani,
            "MN" => Role::Mandor,
            "AS" => Role::Asisten,
            _ => Role::Unknown,
        }
    }

    pub fn is_verifier(&self) -> bool {
        matches!(self, Role::Mandor | Role::Asisten)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kerani => write!(f, "kerani"),
            Self::Mandor => write!(f, "mandor"),
            Self::Asisten => write!(f, "asisten"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
