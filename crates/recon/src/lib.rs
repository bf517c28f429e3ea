//! `ffbaudit-recon` — FFB harvest verification engine.
//!
//! Pure engine crate: receives pre-loaded scan records, returns per-division
//! verification summaries. No subprocess or database dependencies.

pub mod adjust;
pub mod classify;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod pairing;
pub mod summary;

pub use classify::Role;
pub use config::AuditConfig;
pub use directory::{DivisionMap, EmployeeDirectory};
pub use engine::{reconcile, run, AuditInput, Period, ReconOptions};
pub use error::AuditError;
pub use model::{AuditResult, BunchCounts, DivisionSummary, ScanRecord};
