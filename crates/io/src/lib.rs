//! `ffbaudit-io` — row ingestion for the verification engine.
//!
//! The legacy estate databases are reachable only through the `isql`
//! command-line client, so ingestion means parsing its aligned table
//! output (or CSV exports of it) into typed `ScanRecord`s, plus loading
//! the small lookup CSVs: employee directory, field→division map, and
//! reference targets.

pub mod error;
pub mod isql;
pub mod lookups;

pub use error::IngestError;
pub use isql::{parse_table, read_to_string, IsqlTable};
pub use lookups::{load_directory, load_division_map, load_targets};
