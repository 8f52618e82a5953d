//! Content extraction
//!
//! Normalizes arbitrarily nested containers into a line stream for the
//! [`MatchEngine`]. Each stream is sniffed from a bounded prefix and routed:
//!
//! - plain text is scanned line by line (invalid UTF-8 decoded lossily)
//! - gzip is decompressed and routed again
//! - zip entries are routed one by one and their results folded together
//! - video containers and bzip2 are skipped
//!
//! Nesting is bounded; a stream nested deeper than `max_depth` containers
//! fails with [`DecodeError::NestingTooDeep`].

pub mod sniff;

use crate::detector::{MatchBucket, MatchEngine};
use crate::domain::DecodeError;
use flate2::read::GzDecoder;
use sniff::{sniff, ContentKind, SNIFF_LEN};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Default container nesting limit
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Result of scanning one file
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Accumulated content matches
    pub bucket: MatchBucket,
    /// Number of text lines scanned
    pub line_count: usize,
}

impl ExtractedContent {
    fn empty(engine: &MatchEngine) -> Self {
        Self {
            bucket: engine.new_bucket(),
            line_count: 0,
        }
    }

    fn merge(&mut self, other: ExtractedContent) {
        self.bucket.merge(other.bucket);
        self.line_count += other.line_count;
    }
}

/// Sniff-then-route decoder feeding the match engine
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    engine: MatchEngine,
    max_depth: usize,
}

impl ContentExtractor {
    /// Creates an extractor
    pub fn new(engine: MatchEngine, max_depth: usize) -> Self {
        Self { engine, max_depth }
    }

    /// The engine lines are fed to
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Opens and scans a file
    pub fn extract_path(&self, path: &Path) -> Result<ExtractedContent, DecodeError> {
        let mut file = File::open(path)?;
        self.extract(&mut file)
    }

    /// Scans a stream
    pub fn extract(&self, reader: &mut dyn Read) -> Result<ExtractedContent, DecodeError> {
        self.extract_at(reader, 0)
    }

    fn extract_at(&self, reader: &mut dyn Read, depth: usize) -> Result<ExtractedContent, DecodeError> {
        let mut prefix = Vec::with_capacity(SNIFF_LEN);
        Read::take(&mut *reader, SNIFF_LEN as u64).read_to_end(&mut prefix)?;
        let kind = sniff(&prefix);
        let mut stream = Cursor::new(prefix).chain(reader);

        match kind {
            ContentKind::Skip => {
                tracing::debug!("Skipping binary content");
                Ok(ExtractedContent::empty(&self.engine))
            }
            ContentKind::PlainText => self.scan_lines(&mut stream),
            ContentKind::Gzip => {
                self.check_depth(depth)?;
                let mut decoder = GzDecoder::new(stream);
                self.extract_at(&mut decoder, depth + 1)
                    .map_err(|e| match e {
                        DecodeError::Io(msg) => DecodeError::Gzip(msg),
                        other => other,
                    })
            }
            ContentKind::Zip => {
                self.check_depth(depth)?;
                self.scan_zip(&mut stream, depth + 1)
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::NestingTooDeep {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }

    fn scan_zip(&self, reader: &mut dyn Read, depth: usize) -> Result<ExtractedContent, DecodeError> {
        // the central directory sits at the end; buffer the whole archive
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

        let mut content = ExtractedContent::empty(&self.engine);
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            tracing::trace!(entry = entry.name(), "Scanning archive entry");
            let extracted = self.extract_at(&mut entry, depth).map_err(|e| match e {
                DecodeError::Io(msg) => DecodeError::Zip(msg),
                other => other,
            })?;
            content.merge(extracted);
        }
        Ok(content)
    }

    fn scan_lines(&self, reader: &mut dyn Read) -> Result<ExtractedContent, DecodeError> {
        let mut content = ExtractedContent::empty(&self.engine);
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf);
            self.engine.observe(&mut content.bucket, &line);
            content.line_count += 1;
        }

        Ok(content)
    }
}
