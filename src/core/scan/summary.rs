//! Scan summary
//!
//! Counters collected by the orchestrator while units complete.

use crate::domain::RuleMatch;
use std::time::Duration;

/// Summary of a finished scan
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Units returned by discovery
    pub units_discovered: usize,

    /// Units that were sampled and classified
    pub units_scanned: usize,

    /// Units skipped after cancellation
    pub units_skipped: usize,

    /// Values inspected across all units (rows or lines)
    pub records_scanned: usize,

    /// Every match, in completion order
    pub matches: Vec<RuleMatch>,

    /// Whether a shutdown signal stopped the scan early
    pub interrupted: bool,

    /// Wall clock duration
    pub duration: Duration,
}

impl ScanSummary {
    /// Creates an empty summary for `units_discovered` units
    pub fn new(units_discovered: usize) -> Self {
        Self {
            units_discovered,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Number of high confidence matches
    pub fn high_matches(&self) -> usize {
        self.matches.iter().filter(|m| m.is_high()).count()
    }

    /// Number of low confidence matches
    pub fn low_matches(&self) -> usize {
        self.matches.len() - self.high_matches()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            units_discovered = self.units_discovered,
            units_scanned = self.units_scanned,
            units_skipped = self.units_skipped,
            records_scanned = self.records_scanned,
            high_matches = self.high_matches(),
            low_matches = self.low_matches(),
            duration_ms = self.duration.as_millis(),
            "Scan completed"
        );

        if self.interrupted {
            tracing::warn!(
                units_skipped = self.units_skipped,
                "Scan interrupted before all units were scanned"
            );
        }
    }
}

/// How a scan ended
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Discovery returned no units; nothing was sampled
    NothingToScan,
    /// Every discovered unit was scanned, or skipped after a shutdown signal
    Completed(ScanSummary),
}
