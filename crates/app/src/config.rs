//! Application configuration

use clap::{Args, ValueEnum};

/// Application settings, read from flags, the environment and `.env`.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `SQLite` connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://bistro.db")]
    pub database_url: String,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
