//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Estate cron jobs branch
//! on them, so changing a value is a breaking change.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, missing file)             |
//! | 3    | Invalid audit config (parse or validation failure)   |
//! | 4    | Runtime error (ingestion, engine, output)            |
//! | 5    | Verification rate below the configured threshold     |
//! | 6    | Adjustment finished with warnings (clamped targets)  |
//! | 7    | isql unavailable or fetch failed                     |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Audit config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable input, engine error, unwritable output.
pub const EXIT_RUNTIME: u8 = 4;

/// At least one division's verification rate is below
/// `options.min_verification_rate`.
pub const EXIT_RATE_BELOW_THRESHOLD: u8 = 5;

/// The target adjustment emitted warnings (clamped allocations or a
/// defaulted fallback division). The result is still written.
pub const EXIT_ADJUSTMENT_WARNINGS: u8 = 6;

/// `isql` binary not found, or the fetch subprocess failed.
pub const EXIT_FETCH: u8 = 7;
