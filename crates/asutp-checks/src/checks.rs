//! The check routines.
//!
//! Each check reads through a [`DiagnosticStore`], prints its section body and
//! returns its outcome. Expected conditions (a missing schema, no users, an
//! unknown sentinel tag) are reported as [`CheckOutcome::Failed`]; only store
//! and output errors come back as `Err`.

use crate::report::{CheckOutcome, Reporter};
use asutp_common::config::ChecksConfig;
use asutp_common::error::AsutpResult;
use asutp_common::models::{EXPECTED_SCHEMAS, SchemaTableCount};
use asutp_db::DiagnosticStore;
use chrono::Utc;
use std::future::Future;
use std::io::Write;
use std::time::{Duration, Instant};

/// Value written to the sentinel by the parameter-write check.
pub const WRITE_TEST_VALUE: f64 = 2850.5;

/// Base of the values written by the timed write loop.
pub const BURST_BASE_VALUE: f64 = 2800.0;

/// Settings shared by all checks of one run.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub sentinel_tag: String,
    pub allow_writes: bool,
    pub read_limit: u32,
    pub write_iterations: u32,
}

impl From<&ChecksConfig> for CheckContext {
    fn from(config: &ChecksConfig) -> Self {
        Self {
            sentinel_tag: config.sentinel_tag.clone(),
            allow_writes: config.allow_writes,
            read_limit: config.read_limit,
            write_iterations: config.write_iterations,
        }
    }
}

/// Sum of the per-schema table counts.
pub fn total_tables(counts: &[SchemaTableCount]) -> i64 {
    counts.iter().map(|c| c.table_count).sum()
}

/// Items per second, `None` when no time was measured.
pub fn throughput(items: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    (secs > 0.0).then(|| items as f64 / secs)
}

/// Value of the `i`-th update in the timed write loop.
pub fn burst_value(i: u32) -> f64 {
    BURST_BASE_VALUE + f64::from(i)
}

/// Await `fut` and measure only that.
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let started = Instant::now();
    let output = fut.await;
    (output, started.elapsed())
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn rate(per_sec: Option<f64>) -> String {
    per_sec.map_or_else(|| "n/a".to_string(), |r| format!("{r:.0}"))
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

/// All expected schemas exist.
pub async fn schemas<S: DiagnosticStore, W: Write>(
    store: &mut S,
    _ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let found = store.schema_names(&EXPECTED_SCHEMAS).await?;

    let mut missing = 0;
    for schema in EXPECTED_SCHEMAS {
        if found.iter().any(|f| f == schema) {
            out.pass(format!("Schema {schema} found"))?;
        } else {
            missing += 1;
            out.fail(format!("Schema {schema} NOT found"))?;
        }
    }

    if missing > 0 {
        tracing::warn!(missing, "Expected schemas are missing");
    }
    Ok(CheckOutcome::from_bool(missing == 0))
}

/// The expected schemas hold at least one table between them.
pub async fn table_counts<S: DiagnosticStore, W: Write>(
    store: &mut S,
    _ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let counts = store.table_counts(&EXPECTED_SCHEMAS).await?;
    for row in &counts {
        out.line(format!("{}: {} tables", row.table_schema, row.table_count))?;
    }

    let total = total_tables(&counts);
    out.blank()?;
    out.line(format!("Total tables: {total}"))?;
    Ok(CheckOutcome::from_bool(total > 0))
}

/// Parameters exist; prints the breakdown and the sentinel's current value.
pub async fn parameters<S: DiagnosticStore, W: Write>(
    store: &mut S,
    ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let by_type = store.parameter_type_counts().await?;
    out.line("Parameter types:")?;
    for row in &by_type {
        out.item(format!("{}: {}", or_na(&row.parameter_type), row.count))?;
    }
    let total: i64 = by_type.iter().map(|r| r.count).sum();
    out.blank()?;
    out.line(format!("Total parameters: {total}"))?;

    let current = store.current_value_count().await?;
    out.line(format!("Current values: {current}"))?;

    if let Some(param) = store.parameter_snapshot(&ctx.sentinel_tag).await? {
        out.blank()?;
        out.line("Sample parameter:")?;
        out.item(format!("Tag: {}", param.tag))?;
        out.item(format!("Name: {}", or_na(&param.name)))?;
        out.item(format!(
            "Value: {} {}",
            or_na(&param.value),
            param.unit.as_deref().unwrap_or("")
        ))?;
        out.item(format!("Quality: {}", or_na(&param.quality)))?;
        out.item(format!("Time: {}", or_na(&param.timestamp)))?;
    }

    Ok(CheckOutcome::from_bool(total > 0))
}

/// At least one active user exists; prints roles and users.
pub async fn users_and_roles<S: DiagnosticStore, W: Write>(
    store: &mut S,
    _ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let roles = store.roles().await?;
    out.line("Roles:")?;
    for role in &roles {
        out.item(format!("- {}: {}", role.code, role.name))?;
    }

    let users = store.active_users().await?;
    out.blank()?;
    out.line("Active users:")?;
    for user in &users {
        out.item(format!(
            "{}: {} [{}]",
            user.username,
            or_na(&user.full_name),
            user.roles.as_deref().unwrap_or("")
        ))?;
    }

    if users.is_empty() {
        out.fail("No active users found")?;
    }
    Ok(CheckOutcome::from_bool(!users.is_empty()))
}

/// Upsert the sentinel's current value and commit.
///
/// The sentinel lookup runs even when writes are disabled, so a missing
/// parameter is still reported as a failure.
pub async fn write_parameter<S: DiagnosticStore, W: Write>(
    store: &mut S,
    ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let Some(parameter_id) = store.parameter_id(&ctx.sentinel_tag).await? else {
        out.fail(format!("Parameter {} not found", ctx.sentinel_tag))?;
        return Ok(CheckOutcome::Failed);
    };

    if !ctx.allow_writes {
        out.line("Skipped: writes are disabled (pass --allow-writes to enable)")?;
        return Ok(CheckOutcome::Skipped);
    }

    let stored = store
        .upsert_current_value(parameter_id, WRITE_TEST_VALUE, Utc::now())
        .await?;
    tracing::info!(
        tag = %ctx.sentinel_tag,
        parameter_id,
        value = WRITE_TEST_VALUE,
        "Sentinel current value written"
    );
    out.pass(format!(
        "Value written: {} at {}",
        or_na(&stored.value),
        or_na(&stored.timestamp)
    ))?;
    Ok(CheckOutcome::Passed)
}

/// Archive size, period and partitions. An empty archive is not a failure.
pub async fn archive_data<S: DiagnosticStore, W: Write>(
    store: &mut S,
    _ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let summary = store.archive_summary().await?;
    if summary.is_empty() {
        out.line("No archive data")?;
    } else {
        out.line(format!("Archive records: {}", summary.total_records))?;
        out.line(format!(
            "Period: {} to {}",
            or_na(&summary.oldest),
            or_na(&summary.newest)
        ))?;
    }

    let partitions = store.archive_partitions().await?;
    if !partitions.is_empty() {
        out.blank()?;
        out.line(format!("Archive partitions ({}):", partitions.len()))?;
        for partition in &partitions {
            out.item(format!("- {partition}"))?;
        }
    }

    Ok(CheckOutcome::Passed)
}

/// Client-observed read and write latency.
pub async fn performance<S: DiagnosticStore, W: Write>(
    store: &mut S,
    ctx: &CheckContext,
    out: &mut Reporter<W>,
) -> AsutpResult<CheckOutcome> {
    let (rows, read_elapsed) = timed(store.read_active_parameters(ctx.read_limit)).await;
    let rows = rows?;
    let read_rate = throughput(rows.len() as u64, read_elapsed);
    tracing::debug!(rows = rows.len(), elapsed_ms = millis(read_elapsed), "Timed read done");
    out.line(format!(
        "Read {} parameters (limit {}): {:.2} ms",
        rows.len(),
        ctx.read_limit,
        millis(read_elapsed)
    ))?;
    out.line(format!("Rate: {} parameters/sec", rate(read_rate)))?;

    if !ctx.allow_writes {
        out.blank()?;
        out.line("Write benchmark skipped: writes are disabled")?;
        return Ok(CheckOutcome::Passed);
    }

    let values: Vec<f64> = (0..ctx.write_iterations).map(burst_value).collect();
    let (updated, write_elapsed) = timed(store.write_burst(&ctx.sentinel_tag, &values)).await;
    let updated = updated?;
    let write_rate = throughput(values.len() as u64, write_elapsed);
    tracing::debug!(updated, elapsed_ms = millis(write_elapsed), "Timed write done");
    out.blank()?;
    out.line(format!(
        "Write {} values: {:.2} ms ({updated} rows updated)",
        values.len(),
        millis(write_elapsed)
    ))?;
    out.line(format!("Rate: {} writes/sec", rate(write_rate)))?;

    Ok(CheckOutcome::Passed)
}
