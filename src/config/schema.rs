//! Configuration schema types

use crate::extract::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

/// Main privscan configuration
///
/// Every section is optional; a missing file yields [`PrivscanConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivscanConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Scan behavior
    #[serde(default)]
    pub scan: ScanConfig,

    /// PostgreSQL pool settings
    #[serde(default)]
    pub postgres: PostgresConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PrivscanConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.scan.validate()?;
        self.postgres.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Records sampled per table
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Minimum number of matching values for a rule to fire
    #[serde(default = "default_min_count")]
    pub min_count: usize,

    /// Worker threads (defaults to the number of CPUs)
    #[serde(default)]
    pub processes: Option<usize>,

    /// Files scanned concurrently
    #[serde(default = "default_max_file_concurrency")]
    pub max_file_concurrency: usize,

    /// Maximum container nesting (gzip in zip in gzip...)
    #[serde(default = "default_max_archive_depth")]
    pub max_archive_depth: usize,

    /// Print sample values
    #[serde(default)]
    pub show_data: bool,

    /// Print low confidence matches
    #[serde(default)]
    pub show_all: bool,

    /// Comma separated rules to keep
    #[serde(default)]
    pub only: Option<String>,

    /// Comma separated rules to drop
    #[serde(default)]
    pub except: Option<String>,

    /// Custom regular expression replacing every rule
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ScanConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sample_size == 0 {
            return Err("scan.sample_size must be > 0".to_string());
        }

        if self.min_count == 0 {
            return Err("scan.min_count must be > 0".to_string());
        }

        if let Some(processes) = self.processes {
            if processes == 0 || processes > 1024 {
                return Err(format!(
                    "scan.processes must be between 1 and 1024, got {processes}"
                ));
            }
        }

        if self.max_file_concurrency == 0 || self.max_file_concurrency > 1000 {
            return Err(format!(
                "scan.max_file_concurrency must be between 1 and 1000, got {}",
                self.max_file_concurrency
            ));
        }

        if self.max_archive_depth == 0 || self.max_archive_depth > 64 {
            return Err(format!(
                "scan.max_archive_depth must be between 1 and 64, got {}",
                self.max_archive_depth
            ));
        }

        if has_entries(&self.only) && has_entries(&self.except) {
            return Err("scan.only and scan.except cannot both be set".to_string());
        }

        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            min_count: default_min_count(),
            processes: None,
            max_file_concurrency: default_max_file_concurrency(),
            max_archive_depth: default_max_archive_depth(),
            show_data: false,
            show_all: false,
            only: None,
            except: None,
            pattern: None,
        }
    }
}

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Maximum number of pooled connections
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: usize,

    /// Connection timeout in seconds
    #[serde(default = "default_pg_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    /// Statement timeout in seconds (0 disables it)
    #[serde(default = "default_pg_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,
}

impl PostgresConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(format!(
                "postgres.max_connections must be between 1 and 100, got {}",
                self.max_connections
            ));
        }

        if self.connection_timeout_seconds == 0 {
            return Err("postgres.connection_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: default_pg_max_connections(),
            connection_timeout_seconds: default_pg_connection_timeout_seconds(),
            statement_timeout_seconds: default_pg_statement_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn has_entries(list: &Option<String>) -> bool {
    list.as_deref()
        .is_some_and(|l| l.split(',').any(|s| !s.trim().is_empty()))
}

// Default value functions
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_sample_size() -> usize {
    10_000
}

fn default_min_count() -> usize {
    1
}

fn default_max_file_concurrency() -> usize {
    20
}

fn default_max_archive_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_pg_max_connections() -> usize {
    2
}

fn default_pg_connection_timeout_seconds() -> u64 {
    30
}

fn default_pg_statement_timeout_seconds() -> u64 {
    0
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
