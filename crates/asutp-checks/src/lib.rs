//! # asutp-checks
//!
//! The diagnostic battery: a fixed, ordered registry of checks run against any
//! [`asutp_db::DiagnosticStore`], and the report printer that tallies them.
//!
//! Checks never abort the run. A check either reports an outcome or returns an
//! error, which the runner records as a failure before moving on.

pub mod checks;
pub mod registry;
pub mod report;
pub mod runner;

#[cfg(test)]
mod testing;

pub use checks::CheckContext;
pub use report::{CheckOutcome, Reporter, RunSummary};
pub use runner::{SessionStatus, run_checks, run_session};
