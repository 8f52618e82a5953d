// privscan - Sensitive Data Sampling Scanner
// Copyright (c) 2025 privscan Contributors
// Licensed under the MIT License

//! # privscan - Sensitive Data Sampling Scanner
//!
//! privscan samples records from a data source and flags fields that look
//! like unencrypted personal data: emails, phone numbers, credit cards,
//! national identifiers, addresses, locations, tokens and more.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Scan orchestration and summary
//! - [`adapters`] - Data source backends (local files, PostgreSQL)
//! - [`rules`] - Builtin rule catalog, selection and field name tokenizing
//! - [`detector`] - Match engine, buckets and confidence classification
//! - [`extract`] - Content sniffing and gzip/zip decoding for files
//! - [`report`] - Console output
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use privscan::config::PrivscanConfig;
//! use privscan::core::scan::run_scan;
//! use privscan::report::{ReportOptions, Reporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = PrivscanConfig::default();
//!     config.scan.only = Some("email,phone".to_string());
//!
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!     let reporter = Reporter::stdout(ReportOptions::default());
//!     run_scan("postgres://localhost/app", &config, reporter, shutdown).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Detection
//!
//! Each rule matches field values with a regular expression, field names with
//! keywords, or, for composite rules, pairs of sibling field names:
//!
//! ```rust
//! use privscan::detector::MatchEngine;
//! use privscan::rules::RuleCatalog;
//! use std::sync::Arc;
//!
//! let engine = MatchEngine::new(Arc::new(RuleCatalog::load().unwrap()));
//! let bucket = engine.evaluate("contact", &["alice@example.org", ""]);
//! assert!(bucket.has_hits());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod detector;
pub mod domain;
pub mod extract;
pub mod logging;
pub mod report;
pub mod rules;
