//! Core scan logic for privscan.
//!
//! # Scan Workflow
//!
//! 1. **Resolve rules**: apply `--only`, `--except` or `--pattern` to the
//!    builtin catalog; invalid names fail here
//! 2. **Select backend**: pick a data source from the locator scheme
//! 3. **Discover**: list tables or files
//! 4. **Sample**: fetch rows per table (serialized) or scan files (bounded
//!    parallelism)
//! 5. **Classify**: turn bucket counts into High/Low matches
//! 6. **Report**: print each unit as it completes, then a closing summary
//!
//! # Example
//!
//! ```rust,no_run
//! use privscan::config::PrivscanConfig;
//! use privscan::core::scan::{run_scan, ScanOutcome};
//! use privscan::report::{ReportOptions, Reporter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PrivscanConfig::default();
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let reporter = Reporter::stdout(ReportOptions::default());
//!
//! match run_scan("file://data", &config, reporter, shutdown_rx).await? {
//!     ScanOutcome::NothingToScan => println!("nothing to scan"),
//!     ScanOutcome::Completed(summary) => println!("{} matches", summary.matches.len()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod scan;
