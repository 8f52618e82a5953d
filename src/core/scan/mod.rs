//! Scan orchestration
//!
//! Ties the rule catalog, a data source, the detector and the reporter
//! together for one run.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{ScanOptions, ScanOrchestrator};
pub use summary::{ScanOutcome, ScanSummary};

use crate::adapters::create_data_source;
use crate::config::PrivscanConfig;
use crate::domain::Result;
use crate::report::Reporter;
use tokio::sync::watch;

/// Scans the data source at `locator`
///
/// Rule selection and the locator scheme are validated before the backend is
/// contacted.
///
/// # Errors
///
/// Configuration errors first, then connection errors from the backend, then
/// the first unit failure.
pub async fn run_scan(
    locator: &str,
    config: &PrivscanConfig,
    reporter: Reporter,
    shutdown: watch::Receiver<bool>,
) -> Result<ScanOutcome> {
    let options = ScanOptions::from_config(&config.scan)?;
    let orchestrator = ScanOrchestrator::new(options, reporter, shutdown)?;
    let source = create_data_source(locator, config)?;
    tracing::debug!(source = ?source, "Data source selected");
    orchestrator.run(source, locator).await
}
