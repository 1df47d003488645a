//! Runs the registry against one connection and prints the report.

use crate::checks::CheckContext;
use crate::registry::REGISTRY;
use crate::report::{CheckOutcome, Reporter, RunSummary};
use asutp_common::error::AsutpResult;
use asutp_db::DiagnosticStore;
use std::future::Future;
use std::io::Write;
use std::time::Instant;

pub const REPORT_TITLE: &str = "ASU TP DATABASE DIAGNOSTICS";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Could not connect; no check ran.
    ConnectFailed,
    Completed(RunSummary),
}

impl SessionStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConnectFailed => 1,
            Self::Completed(summary) => summary.exit_code(),
        }
    }
}

/// Run every registered check in order.
///
/// An error escaping a check marks that check failed; the remaining checks
/// still run. Only failing to write the report itself aborts.
pub async fn run_checks<S: DiagnosticStore, W: Write>(
    store: &mut S,
    ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<RunSummary> {
    let mut summary = RunSummary::default();

    for check in &REGISTRY {
        tracing::debug!(check = check.name, writes = check.writes, "Running check");
        out.section(check.title)?;

        let started = Instant::now();
        let outcome = match check.run(store, ctx, out).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(check = check.name, code = e.error_code(), "Check error: {e}");
                out.fail(format!("Error: {e}"))?;
                CheckOutcome::Failed
            }
        };

        tracing::info!(
            check = check.name,
            outcome = outcome.label(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Check finished"
        );
        summary.record(check.name, outcome);
    }

    Ok(summary)
}

/// Connect, run all checks, print the summary and close.
///
/// A failed connect ends the session before any check runs. The store is
/// closed exactly once after the summary, whatever the check outcomes.
pub async fn run_session<S, F, W>(
    connect: F,
    target: &str,
    ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<SessionStatus>
where
    S: DiagnosticStore,
    F: Future<Output = AsutpResult<S>>,
    W: Write,
{
    out.banner(REPORT_TITLE)?;
    out.status(format!("Connecting to {target}..."))?;

    let mut store = match connect.await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(database = %target, "Connection failed: {e}");
            out.status(format!("✗ Connection failed: {e}"))?;
            out.flush()?;
            return Ok(SessionStatus::ConnectFailed);
        }
    };
    out.status("✓ Connection established")?;
    if !ctx.allow_writes {
        out.status("Writes disabled: the write checks will not modify data")?;
    }

    let checks = run_checks(&mut store, ctx, out).await;
    let printed = match &checks {
        Ok(summary) => summary.print(out),
        Err(_) => Ok(()),
    };

    match store.close().await {
        Ok(()) => {
            out.blank()?;
            out.status("✓ Connection closed")?;
        }
        Err(e) => {
            tracing::warn!("Failed to close connection: {e}");
            out.blank()?;
            out.status(format!("✗ Failed to close connection: {e}"))?;
        }
    }
    out.flush()?;

    let summary = checks?;
    printed?;
    Ok(SessionStatus::Completed(summary))
}
