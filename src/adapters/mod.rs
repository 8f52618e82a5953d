//! Data source backends for privscan.
//!
//! - [`traits`] - the structured and file source contracts
//! - [`factory`] - backend selection by locator scheme
//! - [`local_files`] - `file://` paths on the local disk
//! - [`postgresql`] - `postgres://` / `postgresql://` databases
//!
//! # Design Pattern
//!
//! Backends follow the **Adapter Pattern**: the scan orchestrator only sees
//! [`StructuredSource`] or [`FileSource`] trait objects, so tests can plug in
//! in-memory implementations.
//!
//! ```rust,no_run
//! use privscan::adapters::{create_data_source, DataSource};
//! use privscan::config::PrivscanConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PrivscanConfig::default();
//! match create_data_source("file://data", &config)? {
//!     DataSource::Files(mut source) => {
//!         source.init("file://data").await?;
//!         let files = source.discover_units().await?;
//!         println!("{} files", files.len());
//!     }
//!     DataSource::Structured(_) => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod local_files;
pub mod postgresql;
pub mod traits;

pub use factory::{create_data_source, scheme_of, DataSource};
pub use local_files::LocalFileSource;
pub use postgresql::PostgresSource;
pub use traits::{FileSource, StructuredSource};
