//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing`/`tracing-subscriber` stack for the core:
//! - Pretty, JSON, and compact output formats
//! - Module-level filtering via env-filter directives (and `RUST_LOG`)
//! - Redaction helpers so tokens and credentials never reach log output
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use tracing::Level;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_level(Level::DEBUG);
//!
//! init_logging(config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

use crate::error::{Error, Result};
use tracing::Level;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level when no filter directives are given
    pub level: Level,
    /// Optional env-filter directives (e.g. `"core_playback=trace,info"`);
    /// overrides `level` when present
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Level::INFO,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the minimum log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set explicit env-filter directives.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level and directives so
/// deployments can be re-filtered without a rebuild. Can only succeed once per
/// process; a second call returns a `Config` error.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let fallback = config
        .filter
        .clone()
        .unwrap_or_else(|| config.level.to_string());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", fallback, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

/// Redact a field value when the field name suggests sensitive content.
///
/// Tokens, passwords, and secrets are replaced wholesale; emails keep their
/// first character so correlated log lines stay matchable.
pub fn redact_if_sensitive(field: &str, value: &str) -> String {
    let lowered = field.to_ascii_lowercase();

    if lowered.contains("token") || lowered.contains("password") || lowered.contains("secret") {
        return "[REDACTED]".to_string();
    }

    if lowered.contains("email") {
        let mut chars = value.chars();
        return match chars.next() {
            Some(first) => format!("{}***[REDACTED]", first),
            None => "[REDACTED]".to_string(),
        };
    }

    value.to_string()
}
