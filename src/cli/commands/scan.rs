//! Scan command implementation
//!
//! Runs one scan and maps its outcome to a process exit code.

use crate::cli::Cli;
use crate::config::{redact_locator, PrivscanConfig};
use crate::core::scan::{run_scan, ScanOutcome};
use crate::domain::Result;
use crate::log_error_with_context;
use crate::report::{ReportOptions, Reporter};
use tokio::sync::watch;

/// Exit code after a shutdown signal (standard Unix convention for SIGINT)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Execute the scan
///
/// Report lines go to standard output, errors to standard error.
pub async fn execute(
    cli: &Cli,
    config: &PrivscanConfig,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    tracing::info!(locator = %redact_locator(&cli.url), "Starting scan");

    let reporter = Reporter::stdout(ReportOptions {
        show_data: config.scan.show_data,
        show_all: config.scan.show_all,
    });

    let outcome = run_scan(&cli.url, config, reporter, shutdown_signal).await;
    if let Err(e) = &outcome {
        log_error_with_context!(e, "Scan failed");
        eprintln!("Error: {e}");
    }
    if let Ok(ScanOutcome::Completed(summary)) = &outcome {
        if summary.interrupted {
            eprintln!(
                "Scan interrupted, {} of {} units scanned",
                summary.units_scanned, summary.units_discovered
            );
        }
    }

    Ok(exit_code(&outcome))
}

/// Exit code for a scan outcome
///
/// 0 on success (including nothing to scan), 130 when interrupted, and the
/// error's own code otherwise.
pub fn exit_code(outcome: &Result<ScanOutcome>) -> i32 {
    match outcome {
        Ok(ScanOutcome::NothingToScan) => 0,
        Ok(ScanOutcome::Completed(summary)) if summary.interrupted => EXIT_INTERRUPTED,
        Ok(ScanOutcome::Completed(_)) => 0,
        Err(e) => e.exit_code(),
    }
}
