//! Domain error types
//!
//! This module defines the error hierarchy for privscan. Errors fall into
//! four classes that drive exit behavior:
//!
//! - configuration errors (invalid rule, bad pattern, unknown scheme) are
//!   raised before any backend I/O and never retried
//! - connection errors are raised while initializing a backend
//! - unit errors are raised by a single table query or file scan and become
//!   the final error of the run
//! - decode errors abort the scan of the containing file
//!
//! Third-party error types are converted to strings at the boundary.

use thiserror::Error;

/// Main privscan error type
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid configuration file or option values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A rule name passed to `--only` or `--except` does not exist
    #[error("Invalid rule: {name}. Valid rules are {}", valid.join(", "))]
    InvalidRule {
        /// The offending name
        name: String,
        /// Sorted list of valid rule names
        valid: Vec<String>,
    },

    /// A custom `--pattern` failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(String),

    /// The data source locator uses a scheme no backend handles
    #[error("unknown database scheme: {0}")]
    UnknownScheme(String),

    /// Backend initialization or connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Failure while sampling or scanning a single unit
    #[error("Failed to scan {unit}: {message}")]
    Unit {
        /// Unit identifier (table or file path)
        unit: String,
        /// Underlying failure
        message: String,
    },

    /// Corrupt or unsupported container content
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ScanError {
    /// Creates a unit error for the given unit identifier
    pub fn unit(unit: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ScanError::Unit {
            unit: unit.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error belongs to the configuration class
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScanError::Configuration(_)
                | ScanError::InvalidRule { .. }
                | ScanError::Pattern(_)
                | ScanError::UnknownScheme(_)
        )
    }

    /// Process exit code for this error
    ///
    /// 2 for configuration errors, 4 for connection errors, 1 for unit and
    /// decode errors, 5 for anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_configuration() => 2,
            ScanError::Connection(_) => 4,
            ScanError::Unit { .. } | ScanError::Decode(_) => 1,
            _ => 5,
        }
    }
}

/// Container decoding errors
///
/// Raised by the content extractor. A decode error aborts the scan of the
/// whole file it occurred in and becomes the run's final error.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// gzip stream could not be decompressed
    #[error("invalid gzip stream: {0}")]
    Gzip(String),

    /// zip archive or one of its entries could not be read
    #[error("invalid zip archive: {0}")]
    Zip(String),

    /// Containers nested deeper than the configured limit
    #[error("containers nested deeper than {max_depth} levels")]
    NestingTooDeep {
        /// Configured maximum depth
        max_depth: usize,
    },

    /// Read failure on the underlying stream
    #[error("read failed: {0}")]
    Io(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScanError {
    fn from(err: toml::de::Error) -> Self {
        ScanError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for ScanError {
    fn from(err: regex::Error) -> Self {
        ScanError::Pattern(err.to_string())
    }
}

// Conversion from tokio-postgres errors
impl From<tokio_postgres::Error> for ScanError {
    fn from(err: tokio_postgres::Error) -> Self {
        ScanError::Connection(format!("PostgreSQL error: {err}"))
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for DecodeError {
    fn from(err: zip::result::ZipError) -> Self {
        DecodeError::Zip(err.to_string())
    }
}
