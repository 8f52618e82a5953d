//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PrivscanConfig;
use crate::domain::{Result, ScanError};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`PrivscanConfig`]
/// 4. Applies environment variable overrides (`PRIVSCAN_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ScanError::Configuration`] if the file cannot be read or parsed,
/// a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use privscan::config::loader::load_config;
///
/// let config = load_config("privscan.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PrivscanConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ScanError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ScanError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PrivscanConfig = toml::from_str(&contents)
        .map_err(|e| ScanError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads the configuration file if one is given, defaults otherwise
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: Option<&Path>) -> Result<PrivscanConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = PrivscanConfig::default();
            finish(&mut config)?;
            Ok(config)
        }
    }
}

fn finish(config: &mut PrivscanConfig) -> Result<()> {
    apply_env_overrides(config)?;
    config
        .validate()
        .map_err(|e| ScanError::Configuration(format!("Configuration validation failed: {e}")))
}

/// `${VAR_NAME}` placeholder
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in PLACEHOLDER.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ScanError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            ScanError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the `PRIVSCAN_*` prefix
///
/// Variables follow the pattern `PRIVSCAN_<SECTION>_<KEY>`, for example
/// `PRIVSCAN_SCAN_SAMPLE_SIZE`.
fn apply_env_overrides(config: &mut PrivscanConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PRIVSCAN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Scan overrides
    if let Some(val) = parse_env("PRIVSCAN_SCAN_SAMPLE_SIZE")? {
        config.scan.sample_size = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_MIN_COUNT")? {
        config.scan.min_count = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_PROCESSES")? {
        config.scan.processes = Some(val);
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_MAX_FILE_CONCURRENCY")? {
        config.scan.max_file_concurrency = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_MAX_ARCHIVE_DEPTH")? {
        config.scan.max_archive_depth = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_SHOW_DATA")? {
        config.scan.show_data = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_SCAN_SHOW_ALL")? {
        config.scan.show_all = val;
    }
    if let Ok(val) = std::env::var("PRIVSCAN_SCAN_ONLY") {
        config.scan.only = Some(val);
    }
    if let Ok(val) = std::env::var("PRIVSCAN_SCAN_EXCEPT") {
        config.scan.except = Some(val);
    }
    if let Ok(val) = std::env::var("PRIVSCAN_SCAN_PATTERN") {
        config.scan.pattern = Some(val);
    }

    // PostgreSQL overrides
    if let Some(val) = parse_env("PRIVSCAN_POSTGRES_MAX_CONNECTIONS")? {
        config.postgres.max_connections = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_POSTGRES_CONNECTION_TIMEOUT_SECONDS")? {
        config.postgres.connection_timeout_seconds = val;
    }
    if let Some(val) = parse_env("PRIVSCAN_POSTGRES_STATEMENT_TIMEOUT_SECONDS")? {
        config.postgres.statement_timeout_seconds = val;
    }

    // Logging overrides
    if let Some(val) = parse_env("PRIVSCAN_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("PRIVSCAN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("PRIVSCAN_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
