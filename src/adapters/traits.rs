//! Data source traits
//!
//! Backends plug into the scan orchestrator through one of two narrow
//! contracts: structured sources hand back sampled rows per table, file
//! sources scan whole files through the content extractor.

use crate::domain::{FileLocator, Result, TableSample, TableUnit};
use crate::extract::{ContentExtractor, ExtractedContent};
use async_trait::async_trait;
use std::sync::Arc;

/// A backend that exposes table-like units
///
/// `init` is called exactly once before any other method. Sampling calls are
/// serialized by the orchestrator, so implementations may hold a single
/// connection.
#[async_trait]
pub trait StructuredSource: Send + Sync {
    /// Connects to the backend
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Connection`](crate::domain::ScanError::Connection)
    /// if the backend cannot be reached.
    async fn init(&mut self, locator: &str) -> Result<()>;

    /// Singular noun for a unit (`table`, `collection`)
    fn unit_noun(&self) -> &str;

    /// Singular noun for a sampled record (`row`, `document`)
    fn row_noun(&self) -> &str;

    /// Lists the units to scan
    async fn discover_units(&self) -> Result<Vec<TableUnit>>;

    /// Samples up to `limit` records of a unit
    ///
    /// Every returned row is aligned with the returned field names; absent
    /// values are empty strings.
    async fn sample_unit(&self, unit: &TableUnit, limit: usize) -> Result<TableSample>;
}

/// A backend that exposes files
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Resolves the locator
    async fn init(&mut self, locator: &str) -> Result<()>;

    /// Lists the files to scan
    async fn discover_units(&self) -> Result<Vec<FileLocator>>;

    /// Scans a whole file
    async fn scan_unit(
        &self,
        unit: &FileLocator,
        extractor: Arc<ContentExtractor>,
    ) -> Result<ExtractedContent>;
}
