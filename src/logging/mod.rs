//! Logging and observability
//!
//! Structured logging with:
//! - console output on standard error
//! - configurable log levels (`--log-level`, `RUST_LOG`)
//! - optional local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use privscan::logging::init_logging;
//! use privscan::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Scan started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a unit scan
///
/// # Example
///
/// ```no_run
/// use privscan::log_unit_start;
///
/// log_unit_start!("users", "table");
/// ```
#[macro_export]
macro_rules! log_unit_start {
    ($unit:expr, $noun:expr) => {
        tracing::debug!(
            unit = %$unit,
            kind = $noun,
            "Scanning unit"
        );
    };
}

/// Log the completion of a unit scan
///
/// # Example
///
/// ```no_run
/// use privscan::log_unit_complete;
/// use std::time::Duration;
///
/// log_unit_complete!("users", 2, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_unit_complete {
    ($unit:expr, $matches:expr, $duration:expr) => {
        tracing::debug!(
            unit = %$unit,
            matches = $matches,
            duration_ms = $duration.as_millis(),
            "Unit scanned"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use privscan::log_error_with_context;
/// use privscan::domain::ScanError;
///
/// let error = ScanError::Connection("refused".to_string());
/// log_error_with_context!(&error, "Failed to initialize data source");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
