//! Configuration management for privscan.
//!
//! Configuration is optional. Values come from, in increasing precedence:
//! built-in defaults, a TOML file (`--config` / `PRIVSCAN_CONFIG`),
//! `PRIVSCAN_<SECTION>_<KEY>` environment variables, and command line flags.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [scan]
//! sample_size = 10000
//! min_count = 1
//! max_file_concurrency = 20
//! max_archive_depth = 8
//! except = "ip,mac"
//!
//! [postgres]
//! connection_timeout_seconds = 30
//!
//! [logging]
//! local_enabled = true
//! local_path = "${PRIVSCAN_LOG_DIR}"
//! local_rotation = "daily"
//! ```
//!
//! `${VAR_NAME}` placeholders are substituted from the environment before
//! parsing; a missing variable is a configuration error.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, LoggingConfig, PostgresConfig, PrivscanConfig, ScanConfig};
pub use secret::{redact_locator, ExposeSecret, SecretString};
