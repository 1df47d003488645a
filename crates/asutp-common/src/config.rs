//! Application configuration loaded from defaults, config files, environment
//! variables and command-line overrides.
//!
//! Supports `.env` files for development and environment variables for deployment.
//! Config precedence: CLI flags > env vars > .env file > config file > defaults
//!
//! The database password is never part of the configuration itself. The config
//! names the environment variable that holds it (`database.password_env`).

use crate::error::{AsutpError, AsutpResult};
use serde::Deserialize;

/// Name of the optional config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "asutp-dbcheck";

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Explicit config file; when set it must exist.
    pub config_file: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password_env: Option<String>,
    pub sentinel_tag: Option<String>,
    pub allow_writes: Option<bool>,
}

/// Build the configuration for one run.
///
/// Unlike a process-wide singleton, the result is handed explicitly to the
/// store factory and the checks.
pub fn load(overrides: &Overrides) -> AsutpResult<AppConfig> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let file = match &overrides.config_file {
        Some(path) => config::File::with_name(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let cfg = config::Config::builder()
        // Defaults
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.name", "asu_tp_db")?
        .set_default("database.user", "postgres")?
        .set_default("database.password_env", "ASUTP_DB_PASSWORD")?
        .set_default("checks.sentinel_tag", "REACTOR.POWER")?
        .set_default("checks.allow_writes", false)?
        .set_default("checks.read_limit", 1000)?
        .set_default("checks.write_iterations", 100)?
        .add_source(file)
        // Environment variables (ASUTP__DATABASE__HOST, ASUTP__CHECKS__ALLOW_WRITES, etc.)
        .add_source(
            config::Environment::with_prefix("ASUTP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.host", overrides.host.clone())?
        .set_override_option("database.port", overrides.port.map(i64::from))?
        .set_override_option("database.name", overrides.database.clone())?
        .set_override_option("database.user", overrides.user.clone())?
        .set_override_option("database.password_env", overrides.password_env.clone())?
        .set_override_option("checks.sentinel_tag", overrides.sentinel_tag.clone())?
        .set_override_option("checks.allow_writes", overrides.allow_writes)?
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config.validate()?;

    tracing::debug!(
        database = %app_config.database.target(),
        allow_writes = app_config.checks.allow_writes,
        "Configuration loaded"
    );
    Ok(app_config)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub checks: ChecksConfig,
}

impl AppConfig {
    /// Reject values that would only fail later with a less useful message.
    pub fn validate(&self) -> AsutpResult<()> {
        let db = &self.database;
        if db.host.trim().is_empty() {
            return Err(AsutpError::invalid_config("database.host must not be empty"));
        }
        if db.port == 0 {
            return Err(AsutpError::invalid_config("database.port must not be 0"));
        }
        if db.name.trim().is_empty() {
            return Err(AsutpError::invalid_config("database.name must not be empty"));
        }
        if db.user.trim().is_empty() {
            return Err(AsutpError::invalid_config("database.user must not be empty"));
        }
        if self.checks.sentinel_tag.trim().is_empty() {
            return Err(AsutpError::invalid_config(
                "checks.sentinel_tag must not be empty",
            ));
        }
        if self.checks.read_limit == 0 {
            return Err(AsutpError::invalid_config(
                "checks.read_limit must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    /// Database name
    pub name: String,
    pub user: String,
    /// Environment variable holding the password (default `ASUTP_DB_PASSWORD`).
    pub password_env: String,
}

impl DatabaseConfig {
    /// `host:port/database`, safe to print.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.name)
    }

    /// Resolve the password from the configured environment variable.
    pub fn password(&self) -> Option<String> {
        std::env::var(&self.password_env)
            .ok()
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChecksConfig {
    /// Tag of the canary parameter used by the read and write checks.
    pub sentinel_tag: String,
    /// Opt-in for checks that modify the sentinel's current value.
    pub allow_writes: bool,
    /// Row bound of the timed read.
    pub read_limit: u32,
    /// Number of sequential updates in the timed write loop.
    pub write_iterations: u32,
}
