//! # asutp-dbcheck
//!
//! Connectivity and data-integrity smoke test for the ASU TP database:
//! - connects once with the configured credentials
//! - runs the fixed check battery (schemas, tables, parameters, users,
//!   parameter write, archive, performance)
//! - prints the report to stdout and exits 0 only if nothing failed
//!
//! Logs go to stderr so the report on stdout stays readable.

use anyhow::Context;
use asutp_checks::{CheckContext, Reporter, run_session};
use asutp_common::config::{self, AppConfig, Overrides};
use asutp_db::PgStore;
use clap::Parser;
use clap::builder::FalseyValueParser;
use std::io::Write;
use std::process::ExitCode;

/// Exit code for configuration problems (same as clap's usage errors).
const EXIT_CONFIG_ERROR: u8 = 2;
/// Exit code when the run itself could not complete.
const EXIT_RUN_FAILED: u8 = 1;

/// Why a run ended without a check verdict.
#[derive(Debug)]
enum RunError {
    /// Configuration could not be loaded or was invalid.
    Config(anyhow::Error),
    /// The report could not be written to stdout.
    Output(anyhow::Error),
}

impl RunError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG_ERROR,
            Self::Output(_) => EXIT_RUN_FAILED,
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Self::Config(e) | Self::Output(e) => e,
        }
    }
}

/// ASU TP database diagnostics
#[derive(Parser, Debug)]
#[command(name = "asutp-dbcheck")]
#[command(version)]
#[command(about = "Checks connectivity and basic data integrity of the ASU TP database", long_about = None)]
struct Cli {
    /// Config file (TOML); defaults to ./asutp-dbcheck.toml when present
    #[arg(short, long)]
    config: Option<String>,

    /// Database host
    #[arg(long)]
    host: Option<String>,

    /// Database port
    #[arg(short, long)]
    port: Option<u16>,

    /// Database name
    #[arg(short, long)]
    database: Option<String>,

    /// Database user
    #[arg(short, long)]
    user: Option<String>,

    /// Environment variable holding the database password
    #[arg(long, value_name = "VAR")]
    password_env: Option<String>,

    /// Tag of the parameter used by the read/write checks
    #[arg(long, value_name = "TAG")]
    sentinel_tag: Option<String>,

    /// Allow checks that modify the sentinel parameter's current value
    #[arg(
        long,
        env = "ASUTP_ALLOW_WRITES",
        action = clap::ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    allow_writes: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password_env: self.password_env.clone(),
            sentinel_tag: self.sentinel_tag.clone(),
            // Only an explicit flag overrides the config file.
            allow_writes: self.allow_writes.then_some(true),
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.verbose {
        "asutp=debug,sqlx=info"
    } else {
        "asutp=info,sqlx=warn"
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<u8, RunError> {
    let config = config::load(&cli.overrides())
        .context("Failed to load configuration")
        .map_err(RunError::Config)?;

    tracing::info!(
        "Starting asutp-dbcheck v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.database.target()
    );
    if config.database.password().is_none() {
        tracing::debug!(
            var = %config.database.password_env,
            "No password in environment, relying on the server's auth or PGPASSFILE"
        );
    }

    let stdout = std::io::stdout();
    let mut out = Reporter::new(stdout.lock());
    let code = diagnose(&config, &mut out).await?;
    tracing::info!(exit_code = code, "Diagnostics finished");
    Ok(code)
}

/// Run the session against the configured database, printing to `out`.
async fn diagnose<W: Write>(config: &AppConfig, out: &mut Reporter<W>) -> Result<u8, RunError> {
    let ctx = CheckContext::from(&config.checks);
    let target = config.database.target();
    let status = run_session(PgStore::connect(&config.database), &target, &ctx, out)
        .await
        .context("Failed to write the report")
        .map_err(RunError::Output)?;
    Ok(status.exit_code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:#}", e.error());
            eprintln!("✗ {:#}", e.error());
            ExitCode::from(e.exit_code())
        }
    }
}
