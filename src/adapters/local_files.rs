//! Local filesystem source (`file://<path>`)

use crate::adapters::traits::FileSource;
use crate::domain::{FileLocator, Result, ScanError};
use crate::extract::{ContentExtractor, ExtractedContent};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::WalkDir;

/// Scans a file or a directory tree on the local disk
#[derive(Debug, Default)]
pub struct LocalFileSource {
    root: Option<PathBuf>,
}

impl LocalFileSource {
    /// Creates an uninitialized source
    pub fn new() -> Self {
        Self::default()
    }

    fn walk(root: PathBuf) -> Result<Vec<FileLocator>> {
        if !root.exists() {
            tracing::debug!(path = %root.display(), "Path does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = entry.map_err(|e| ScanError::Io(format!("Failed to list files: {e}")))?;
            if entry.file_type().is_file() {
                files.push(FileLocator::new(entry.into_path()));
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

#[async_trait]
impl FileSource for LocalFileSource {
    async fn init(&mut self, locator: &str) -> Result<()> {
        let path = locator.strip_prefix("file://").unwrap_or(locator);
        if path.is_empty() {
            return Err(ScanError::Configuration(
                "file:// locator requires a path".to_string(),
            ));
        }
        self.root = Some(PathBuf::from(path));
        Ok(())
    }

    async fn discover_units(&self) -> Result<Vec<FileLocator>> {
        let root = self
            .root
            .clone()
            .ok_or_else(|| ScanError::Other("file source used before init".to_string()))?;

        tokio::task::spawn_blocking(move || Self::walk(root))
            .await
            .map_err(|e| ScanError::Other(format!("File discovery task failed: {e}")))?
    }

    async fn scan_unit(
        &self,
        unit: &FileLocator,
        extractor: Arc<ContentExtractor>,
    ) -> Result<ExtractedContent> {
        let path = unit.path.clone();
        let location = unit.location();

        tokio::task::spawn_blocking(move || extractor.extract_path(&path))
            .await
            .map_err(|e| ScanError::unit(&location, e))?
            .map_err(|e| ScanError::unit(&location, e))
    }
}
