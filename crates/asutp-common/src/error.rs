//! Centralized error type for the diagnostic tool.
//!
//! Uses `thiserror` so every layer can bubble driver, config and I/O failures
//! up with `?`. A check that returns one of these is recorded as failed by the
//! runner; only a connect failure ends the run.

/// Core error type shared by the store, the checks and the binary.
#[derive(Debug, thiserror::Error)]
pub enum AsutpError {
    // === Infrastructure errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    // === Validation errors ===
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // === Store errors not raised by the driver ===
    #[error("Store error: {message}")]
    Store { message: String },
}

impl AsutpError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Short classification used in log fields.
    pub fn error_code(&self) -> &str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::Store { .. } => "STORE_ERROR",
        }
    }
}

/// Convenience type alias for Results using AsutpError.
pub type AsutpResult<T> = Result<T, AsutpError>;
