//! Console reporting
//!
//! The reporter owns the output stream (standard output by default). Unit
//! results are printed by the orchestrator's single collector as each unit
//! completes, so lines of different units never interleave.

pub mod format;

use crate::domain::{Result, RuleMatch, ScanError, MAX_SAMPLE_VALUES};
use format::{low_confidence_hint, match_line, plural_noun, pluralize, sample_line};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Display options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print sample values under each match
    pub show_data: bool,
    /// Print low confidence matches
    pub show_all: bool,
}

/// What the scan is about to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanHeader {
    /// Structured source: units are sampled up to `sample_size` rows
    Structured {
        /// Number of discovered units
        units: usize,
        /// Unit noun (`table`, `collection`)
        unit_noun: String,
        /// Rows sampled per unit
        sample_size: usize,
        /// Row noun (`row`, `document`)
        row_noun: String,
    },
    /// File source: every file is scanned entirely
    Files {
        /// Number of discovered files
        units: usize,
    },
}

/// Writes scan results
pub struct Reporter {
    out: Mutex<Box<dyn Write + Send>>,
    options: ReportOptions,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Reporter writing to `out`
    pub fn new(out: Box<dyn Write + Send>, options: ReportOptions) -> Self {
        Self {
            out: Mutex::new(out),
            options,
        }
    }

    /// Reporter writing to standard output
    pub fn stdout(options: ReportOptions) -> Self {
        Self::new(Box::new(std::io::stdout()), options)
    }

    /// Display options
    pub fn options(&self) -> ReportOptions {
        self.options
    }

    /// Prints the discovery line
    ///
    /// A zero-unit header prints `Found no <units> to scan`.
    pub fn print_header(&self, header: &ScanHeader) -> Result<()> {
        let line = match header {
            ScanHeader::Structured { units: 0, unit_noun, .. } => {
                format!("Found no {} to scan\n", plural_noun(unit_noun))
            }
            ScanHeader::Files { units: 0 } => "Found no files to scan\n".to_string(),
            ScanHeader::Structured {
                units,
                unit_noun,
                sample_size,
                row_noun,
            } => format!(
                "Found {} to scan, sampling {} from each...\n\n",
                pluralize(*units, unit_noun),
                pluralize(*sample_size, row_noun)
            ),
            ScanHeader::Files { units } => {
                format!("Found {} to scan...\n\n", pluralize(*units, "file"))
            }
        };
        self.write(&line)
    }

    /// Prints the matches of one completed unit
    ///
    /// Low confidence matches are only printed with `show_all`.
    pub fn print_unit_matches(&self, matches: &[RuleMatch], noun: &str) -> Result<()> {
        let mut text = String::new();
        for m in matches {
            if !m.is_high() && !self.options.show_all {
                continue;
            }
            text.push_str(&match_line(m, noun));
            text.push('\n');
            if self.options.show_data {
                text.push_str(&sample_line(m));
                text.push_str("\n\n");
            }
        }
        if text.is_empty() {
            return Ok(());
        }
        self.write(&text)
    }

    /// Prints the closing lines for the whole run
    pub fn print_summary(&self, matches: &[RuleMatch]) -> Result<()> {
        let mut text = String::new();
        if matches.is_empty() {
            text.push_str("No sensitive data found\n");
        } else {
            if self.options.show_data {
                text.push_str(&format!(
                    "Showing {MAX_SAMPLE_VALUES} unique values from each\n"
                ));
            } else {
                text.push_str("\nUse --show-data to view data\n");
            }
            if !self.options.show_all {
                if let Some(hint) = low_confidence_hint(matches) {
                    text.push_str(&hint);
                    text.push('\n');
                }
            }
        }
        self.write(&text)
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| ScanError::Other("report output lock poisoned".to_string()))?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// In-memory report sink that can be read back after a scan
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    /// Creates an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        match self.inner.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("capture buffer lock poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
