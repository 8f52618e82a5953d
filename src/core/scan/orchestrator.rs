//! Scan orchestrator - drives a data source from discovery to report
//!
//! One task is spawned per unit on a [`JoinSet`]. Structured sources sample
//! through a single-permit semaphore, file sources scan up to
//! `max_file_concurrency` files at once. The orchestrator itself is the only
//! collector: it joins tasks in completion order, prints each unit, and keeps
//! the first error. After an error (or a shutdown signal) tasks that have not
//! started yet skip their unit; running tasks finish.

use super::summary::{ScanOutcome, ScanSummary};
use crate::adapters::{DataSource, FileSource, StructuredSource};
use crate::config::ScanConfig;
use crate::detector::{ConfidenceClassifier, MatchEngine};
use crate::domain::{FileLocator, Result, RuleMatch, ScanError, TableSample, TableUnit};
use crate::extract::ContentExtractor;
use crate::report::{Reporter, ScanHeader};
use crate::rules::{RuleCatalog, RuleFilter, RuleSelection};
use crate::{log_error_with_context, log_unit_complete, log_unit_start};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

const LINE_NOUN: &str = "line";

/// Scan parameters independent of the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Records sampled per structured unit
    pub sample_size: usize,
    /// Minimum hits for a rule to fire
    pub min_count: usize,
    /// Files scanned concurrently
    pub max_file_concurrency: usize,
    /// Container nesting limit for file content
    pub max_archive_depth: usize,
    /// Active rule selection
    pub selection: RuleSelection,
}

impl ScanOptions {
    /// Builds options from the `[scan]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `only` and `except` are both set.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            sample_size: config.sample_size,
            min_count: config.min_count,
            max_file_concurrency: config.max_file_concurrency,
            max_archive_depth: config.max_archive_depth,
            selection: RuleSelection::from_options(
                config.only.as_deref(),
                config.except.as_deref(),
                config.pattern.as_deref(),
            )?,
        })
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        let config = ScanConfig::default();
        Self {
            sample_size: config.sample_size,
            min_count: config.min_count,
            max_file_concurrency: config.max_file_concurrency,
            max_archive_depth: config.max_archive_depth,
            selection: RuleSelection::All,
        }
    }
}

/// Result of one unit task
#[derive(Debug)]
struct UnitReport {
    unit: String,
    records: usize,
    matches: Vec<RuleMatch>,
}

/// Cancellation observed by unit tasks at start
///
/// A failing task raises the flag itself, before it releases its permit, so
/// the next waiter already sees it.
#[derive(Debug, Clone)]
struct CancelFlag {
    failed: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl CancelFlag {
    fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            failed: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.failed.load(Ordering::SeqCst) || *self.shutdown.borrow()
    }

    fn fail(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Raises the flag when `result` is an error
    fn check<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.fail();
        }
        result
    }
}

/// Runs a scan against one data source
pub struct ScanOrchestrator {
    options: ScanOptions,
    engine: MatchEngine,
    classifier: ConfidenceClassifier,
    reporter: Reporter,
    shutdown: watch::Receiver<bool>,
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("options", &self.options)
            .field("rules", &self.engine.catalog().len())
            .finish_non_exhaustive()
    }
}

impl ScanOrchestrator {
    /// Creates an orchestrator
    ///
    /// The active catalog is resolved here, so invalid rule names and bad
    /// patterns fail before any backend is touched.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRule`] or [`ScanError::Pattern`] for a bad
    /// selection.
    pub fn new(
        options: ScanOptions,
        reporter: Reporter,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let catalog = RuleFilter::resolve(&RuleCatalog::load()?, &options.selection)?;
        tracing::debug!(rules = ?catalog.sorted_names(), "Active rules");

        let catalog = Arc::new(catalog);
        Ok(Self {
            engine: MatchEngine::new(Arc::clone(&catalog)),
            classifier: ConfidenceClassifier::new(catalog),
            options,
            reporter,
            shutdown,
        })
    }

    /// Scan options
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Active rule catalog
    pub fn catalog(&self) -> &RuleCatalog {
        self.engine.catalog()
    }

    /// Initializes the source, discovers its units and scans them
    ///
    /// # Errors
    ///
    /// Returns the initialization error, the discovery error, or the first
    /// unit error. Units that completed before the error are already printed.
    pub async fn run(&self, source: DataSource, locator: &str) -> Result<ScanOutcome> {
        let start_time = Instant::now();
        let outcome = match source {
            DataSource::Structured(mut source) => {
                source.init(locator).await?;
                self.run_structured(Arc::from(source)).await?
            }
            DataSource::Files(mut source) => {
                source.init(locator).await?;
                self.run_files(Arc::from(source)).await?
            }
        };

        Ok(match outcome {
            ScanOutcome::Completed(summary) => {
                let summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                ScanOutcome::Completed(summary)
            }
            other => other,
        })
    }

    async fn run_structured(&self, source: Arc<dyn StructuredSource>) -> Result<ScanOutcome> {
        let units = source.discover_units().await?;
        let unit_noun = source.unit_noun().to_string();
        let row_noun = source.row_noun().to_string();

        self.reporter.print_header(&ScanHeader::Structured {
            units: units.len(),
            unit_noun: unit_noun.clone(),
            sample_size: self.options.sample_size,
            row_noun: row_noun.clone(),
        })?;
        if units.is_empty() {
            return Ok(ScanOutcome::NothingToScan);
        }

        let cancel = CancelFlag::new(self.shutdown.clone());
        let permits = Arc::new(Semaphore::new(1));
        let mut tasks: JoinSet<Result<Option<UnitReport>>> = JoinSet::new();

        let discovered = units.len();
        for unit in units {
            let source = Arc::clone(&source);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let engine = self.engine.clone();
            let classifier = self.classifier.clone();
            let limit = self.options.sample_size;
            let min_count = self.options.min_count;
            let unit_noun = unit_noun.clone();

            tasks.spawn(async move {
                let sample = {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| ScanError::Other(format!("Sampling semaphore closed: {e}")))?;
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    log_unit_start!(unit, unit_noun.as_str());
                    cancel.check(source.sample_unit(&unit, limit).await)?
                };
                Ok::<_, ScanError>(Some(classify_table(
                    &engine,
                    &classifier,
                    &unit,
                    &sample,
                    min_count,
                )))
            });
        }

        self.collect(tasks, discovered, &cancel, &row_noun).await
    }

    async fn run_files(&self, source: Arc<dyn FileSource>) -> Result<ScanOutcome> {
        let units = source.discover_units().await?;

        self.reporter
            .print_header(&ScanHeader::Files { units: units.len() })?;
        if units.is_empty() {
            return Ok(ScanOutcome::NothingToScan);
        }

        let extractor = Arc::new(ContentExtractor::new(
            self.engine.clone(),
            self.options.max_archive_depth,
        ));
        let cancel = CancelFlag::new(self.shutdown.clone());
        let permits = Arc::new(Semaphore::new(self.options.max_file_concurrency.max(1)));
        let mut tasks: JoinSet<Result<Option<UnitReport>>> = JoinSet::new();

        let discovered = units.len();
        for unit in units {
            let source = Arc::clone(&source);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let extractor = Arc::clone(&extractor);
            let classifier = self.classifier.clone();
            let min_count = self.options.min_count;

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ScanError::Other(format!("File scan semaphore closed: {e}")))?;
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                let report = cancel.check(
                    scan_file(&*source, &unit, extractor, &classifier, min_count).await,
                )?;
                Ok::<_, ScanError>(Some(report))
            });
        }

        self.collect(tasks, discovered, &cancel, LINE_NOUN).await
    }

    async fn collect(
        &self,
        mut tasks: JoinSet<Result<Option<UnitReport>>>,
        discovered: usize,
        cancel: &CancelFlag,
        noun: &str,
    ) -> Result<ScanOutcome> {
        let mut summary = ScanSummary::new(discovered);
        let mut first_error: Option<ScanError> = None;

        while let Some(joined) = tasks.join_next().await {
            let result = joined
                .map_err(|e| ScanError::Other(format!("Scan task failed: {e}")))
                .and_then(|r| r);

            match result {
                Ok(Some(report)) => {
                    tracing::trace!(unit = %report.unit, records = report.records, "Collected unit");
                    self.reporter.print_unit_matches(&report.matches, noun)?;
                    summary.units_scanned += 1;
                    summary.records_scanned += report.records;
                    summary.matches.extend(report.matches);
                }
                Ok(None) => summary.units_skipped += 1,
                Err(e) => {
                    if first_error.is_none() {
                        log_error_with_context!(&e, "Unit scan failed, cancelling remaining units");
                        cancel.fail();
                        first_error = Some(e);
                    } else {
                        tracing::debug!(error = %e, "Additional unit failure");
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        // a signal after the last unit started interrupts nothing
        summary.interrupted = *self.shutdown.borrow() && summary.units_skipped > 0;
        if !summary.interrupted {
            self.reporter.print_summary(&summary.matches)?;
        }
        Ok(ScanOutcome::Completed(summary))
    }
}

/// Classifies every field and composite of a sampled table
fn classify_table(
    engine: &MatchEngine,
    classifier: &ConfidenceClassifier,
    unit: &TableUnit,
    sample: &TableSample,
    min_count: usize,
) -> UnitReport {
    let started = Instant::now();
    let mut matches = Vec::new();

    for (index, field) in sample.field_names.iter().enumerate() {
        let bucket = engine.evaluate(field, &sample.column(index));
        matches.extend(classifier.classify(&unit.field_location(field), &bucket, min_count));
    }

    for hit in engine.evaluate_composites(sample) {
        matches.extend(classifier.classify_composite(unit, &hit, min_count));
    }

    log_unit_complete!(unit, matches.len(), started.elapsed());
    UnitReport {
        unit: unit.display_name(),
        records: sample.rows.len(),
        matches,
    }
}

async fn scan_file(
    source: &dyn FileSource,
    unit: &FileLocator,
    extractor: Arc<ContentExtractor>,
    classifier: &ConfidenceClassifier,
    min_count: usize,
) -> Result<UnitReport> {
    let started = Instant::now();
    log_unit_start!(unit, "file");

    let content = source.scan_unit(unit, extractor).await?;
    let location = unit.location();
    let matches = classifier.classify(&location, &content.bucket, min_count);

    log_unit_complete!(unit, matches.len(), started.elapsed());
    Ok(UnitReport {
        unit: location,
        records: content.line_count,
        matches,
    })
}
