//! PostgreSQL store and connection helpers.

use crate::DiagnosticStore;
use crate::repository::{archive, catalog, parameters, security};
use asutp_common::config::DatabaseConfig;
use asutp_common::error::AsutpResult;
use asutp_common::models::{
    ActiveParameter, ActiveUser, ArchiveSummary, ParameterSnapshot, ParameterTypeCount,
    QUALITY_GOOD_MANUAL, RoleSummary, SchemaTableCount, StoredValue, WRITE_SOURCE,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, Transaction};

/// Application name reported to the server (visible in `pg_stat_activity`).
pub const APPLICATION_NAME: &str = "asutp-dbcheck";

/// Build connect options from configuration. The password comes from the
/// environment variable named in the config, if it is set.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .application_name(APPLICATION_NAME);
    match config.password() {
        Some(password) => options.password(&password),
        None => options,
    }
}

/// Server version string, e.g. `PostgreSQL 16.2 on x86_64-pc-linux-gnu ...`.
pub async fn server_version(conn: &mut PgConnection) -> Result<String, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(conn)
        .await
}

/// A single live PostgreSQL connection.
pub struct PgStore {
    conn: PgConnection,
    server_version: String,
}

impl PgStore {
    /// Connect using the tool's configuration.
    pub async fn connect(config: &DatabaseConfig) -> AsutpResult<Self> {
        tracing::info!(database = %config.target(), "Connecting to PostgreSQL...");
        Self::connect_with(&connect_options(config)).await
    }

    /// Connect with prepared options (used by the live tests with a URL).
    pub async fn connect_with(options: &PgConnectOptions) -> AsutpResult<Self> {
        let mut conn = PgConnection::connect_with(options).await?;
        let server_version = server_version(&mut conn).await?;
        tracing::info!(%server_version, "Connected to PostgreSQL");
        Ok(Self {
            conn,
            server_version,
        })
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the original error is returned.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, sqlx::Error>,
) -> AsutpResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            } else {
                tracing::debug!("Transaction rolled back");
            }
            Err(e.into())
        }
    }
}

impl DiagnosticStore for PgStore {
    async fn schema_names(&mut self, candidates: &[&str]) -> AsutpResult<Vec<String>> {
        Ok(catalog::find_schemas(&mut self.conn, candidates).await?)
    }

    async fn table_counts(&mut self, schemas: &[&str]) -> AsutpResult<Vec<SchemaTableCount>> {
        Ok(catalog::count_tables(&mut self.conn, schemas).await?)
    }

    async fn parameter_type_counts(&mut self) -> AsutpResult<Vec<ParameterTypeCount>> {
        Ok(parameters::count_by_type(&mut self.conn).await?)
    }

    async fn current_value_count(&mut self) -> AsutpResult<i64> {
        Ok(parameters::count_current_values(&mut self.conn).await?)
    }

    async fn parameter_snapshot(&mut self, tag: &str) -> AsutpResult<Option<ParameterSnapshot>> {
        Ok(parameters::find_snapshot(&mut self.conn, tag).await?)
    }

    async fn roles(&mut self) -> AsutpResult<Vec<RoleSummary>> {
        Ok(security::list_roles(&mut self.conn).await?)
    }

    async fn active_users(&mut self) -> AsutpResult<Vec<ActiveUser>> {
        Ok(security::list_active_users(&mut self.conn).await?)
    }

    async fn parameter_id(&mut self, tag: &str) -> AsutpResult<Option<i64>> {
        Ok(parameters::find_id_by_tag(&mut self.conn, tag).await?)
    }

    async fn upsert_current_value(
        &mut self,
        parameter_id: i64,
        value: f64,
        at: DateTime<Utc>,
    ) -> AsutpResult<StoredValue> {
        let mut tx = self.conn.begin().await?;
        let result = parameters::upsert_current_value(
            &mut *tx,
            parameter_id,
            value,
            QUALITY_GOOD_MANUAL,
            at,
            WRITE_SOURCE,
        )
        .await;
        finish(tx, result).await
    }

    async fn archive_summary(&mut self) -> AsutpResult<ArchiveSummary> {
        Ok(archive::summarize(&mut self.conn).await?)
    }

    async fn archive_partitions(&mut self) -> AsutpResult<Vec<String>> {
        Ok(archive::list_partitions(&mut self.conn).await?)
    }

    async fn read_active_parameters(&mut self, limit: u32) -> AsutpResult<Vec<ActiveParameter>> {
        Ok(parameters::list_active(&mut self.conn, limit).await?)
    }

    async fn write_burst(&mut self, tag: &str, values: &[f64]) -> AsutpResult<u64> {
        let mut tx = self.conn.begin().await?;
        let result = async {
            let mut updated = 0;
            for value in values {
                updated += parameters::update_value_by_tag(&mut *tx, tag, *value).await?;
            }
            Ok::<_, sqlx::Error>(updated)
        }
        .await;
        finish(tx, result).await
    }

    async fn close(self) -> AsutpResult<()> {
        self.conn.close().await?;
        tracing::info!("PostgreSQL connection closed");
        Ok(())
    }
}
