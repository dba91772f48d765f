//! Logging setup for the product controller
//!
//! The core only emits `tracing` events. Hosts pick how they are rendered by
//! installing a subscriber once at startup.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `EDDIE_LOG_LEVEL`: filter directive (e.g. `debug` or
///   `product_state::machine=trace`); falls back to `RUST_LOG`
///
/// # Examples
///
/// ```rust,ignore
/// product_state::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info")?;

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug")?;

            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter);

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `EDDIE_LOG_MODE`
///
/// Accepts `silent`, `development` or `debug`. Unset means silent; any other
/// value is rejected.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("EDDIE_LOG_MODE") {
        Ok(value) => parse_mode(&value)?,
        Err(_) => LoggingMode::Silent,
    };

    init_logging(mode)
}

fn parse_mode(value: &str) -> Result<LoggingMode, LoggingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "silent" => Ok(LoggingMode::Silent),
        "development" | "dev" => Ok(LoggingMode::Development),
        "debug" => Ok(LoggingMode::Debug),
        other => Err(LoggingError::InvalidEnv(format!("EDDIE_LOG_MODE={}", other))),
    }
}

/// Build the filter: `EDDIE_LOG_LEVEL`, then `RUST_LOG`, then the default
fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var("EDDIE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidEnv(format!("{}: {}", directive, e)))
}

/// Check if a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
