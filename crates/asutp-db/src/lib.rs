//! # asutp-db
//!
//! Database layer for the ASU TP diagnostics. Everything the checks read or
//! write goes through [`DiagnosticStore`]:
//! - **PostgreSQL** ([`postgres::PgStore`]) — one live connection per run
//! - test doubles in dependent crates — in-memory stores with failure injection

pub mod postgres;
pub mod repository;

use asutp_common::error::AsutpResult;
use asutp_common::models::{
    ActiveParameter, ActiveUser, ArchiveSummary, ParameterSnapshot, ParameterTypeCount,
    RoleSummary, SchemaTableCount, StoredValue,
};
use chrono::{DateTime, Utc};

pub use postgres::PgStore;

/// Data access used by the diagnostic checks.
///
/// A store exists only while connected; [`DiagnosticStore::close`] consumes it,
/// so nothing can touch the connection afterwards. Operations that write run in
/// their own transaction and either commit or roll back before returning.
#[allow(async_fn_in_trait)]
pub trait DiagnosticStore {
    /// Which of `candidates` exist as schemas.
    async fn schema_names(&mut self, candidates: &[&str]) -> AsutpResult<Vec<String>>;

    /// Base-table counts for the given schemas; schemas without tables are absent.
    async fn table_counts(&mut self, schemas: &[&str]) -> AsutpResult<Vec<SchemaTableCount>>;

    async fn parameter_type_counts(&mut self) -> AsutpResult<Vec<ParameterTypeCount>>;

    async fn current_value_count(&mut self) -> AsutpResult<i64>;

    async fn parameter_snapshot(&mut self, tag: &str) -> AsutpResult<Option<ParameterSnapshot>>;

    /// Roles, highest priority first.
    async fn roles(&mut self) -> AsutpResult<Vec<RoleSummary>>;

    async fn active_users(&mut self) -> AsutpResult<Vec<ActiveUser>>;

    async fn parameter_id(&mut self, tag: &str) -> AsutpResult<Option<i64>>;

    /// Upsert the current value of `parameter_id` and commit.
    async fn upsert_current_value(
        &mut self,
        parameter_id: i64,
        value: f64,
        at: DateTime<Utc>,
    ) -> AsutpResult<StoredValue>;

    async fn archive_summary(&mut self) -> AsutpResult<ArchiveSummary>;

    async fn archive_partitions(&mut self) -> AsutpResult<Vec<String>>;

    /// Up to `limit` active parameters joined to their current values.
    async fn read_active_parameters(&mut self, limit: u32) -> AsutpResult<Vec<ActiveParameter>>;

    /// Apply `values` in order to the current value of `tag`, then commit once.
    /// Returns the number of rows updated.
    async fn write_burst(&mut self, tag: &str, values: &[f64]) -> AsutpResult<u64>;

    /// Release the connection.
    async fn close(self) -> AsutpResult<()>
    where
        Self: Sized;
}
