//! Integration tests for structured sources
//!
//! An in-memory source stands in for a database and counts every backend
//! call, so tests can assert which calls a scan made.

use async_trait::async_trait;
use privscan::adapters::{DataSource, StructuredSource};
use privscan::config::PrivscanConfig;
use privscan::core::scan::{run_scan, ScanOptions, ScanOrchestrator, ScanOutcome, ScanSummary};
use privscan::domain::{Result, ScanError, TableSample, TableUnit};
use privscan::report::{CaptureBuffer, ReportOptions, Reporter};
use privscan::rules::RuleSelection;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
struct Calls {
    init: Arc<AtomicUsize>,
    discover: Arc<AtomicUsize>,
    sample: Arc<AtomicUsize>,
    last_limit: Arc<Mutex<Option<usize>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl Calls {
    fn total(&self) -> usize {
        self.init.load(Ordering::SeqCst)
            + self.discover.load(Ordering::SeqCst)
            + self.sample.load(Ordering::SeqCst)
    }
}

struct MemorySource {
    tables: Vec<TableSample>,
    names: Vec<String>,
    fail_on: Vec<String>,
    delay: Option<Duration>,
    signal_on_sample: Option<watch::Sender<bool>>,
    calls: Calls,
}

impl MemorySource {
    fn new(calls: Calls) -> Self {
        Self {
            tables: Vec::new(),
            names: Vec::new(),
            fail_on: Vec::new(),
            delay: None,
            signal_on_sample: None,
            calls,
        }
    }

    fn table(mut self, name: &str, fields: &[&str], rows: &[&[&str]]) -> Self {
        self.names.push(name.to_string());
        self.tables.push(TableSample::new(
            fields.iter().map(|f| f.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        ));
        self
    }

    fn failing_on(mut self, name: &str) -> Self {
        self.fail_on.push(name.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Raises the shutdown signal while a table is being sampled
    fn signalling(mut self, shutdown: watch::Sender<bool>) -> Self {
        self.signal_on_sample = Some(shutdown);
        self
    }
}

#[async_trait]
impl StructuredSource for MemorySource {
    async fn init(&mut self, _locator: &str) -> Result<()> {
        self.calls.init.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unit_noun(&self) -> &str {
        "table"
    }

    fn row_noun(&self) -> &str {
        "row"
    }

    async fn discover_units(&self) -> Result<Vec<TableUnit>> {
        self.calls.discover.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .names
            .iter()
            .zip(&self.tables)
            .map(|(name, sample)| TableUnit::new(name.clone(), sample.field_names.clone()))
            .collect())
    }

    async fn sample_unit(&self, unit: &TableUnit, limit: usize) -> Result<TableSample> {
        self.calls.sample.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_limit.lock().unwrap() = Some(limit);

        let running = self.calls.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(shutdown) = &self.signal_on_sample {
            shutdown.send_replace(true);
        }
        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on.contains(&unit.name) {
            return Err(ScanError::unit(&unit.name, "relation does not exist"));
        }

        let index = self
            .names
            .iter()
            .position(|n| n == &unit.name)
            .ok_or_else(|| ScanError::unit(&unit.name, "unknown table"))?;
        let mut sample = self.tables[index].clone();
        sample.rows.truncate(limit);
        Ok(sample)
    }
}

fn users(calls: Calls) -> MemorySource {
    MemorySource::new(calls).table(
        "users",
        &["id", "email", "phone", "last_name"],
        &[
            &["1", "alice@example.org", "555-123-4567", "Smith"],
            &["2", "bob@example.org", "555-987-6543", "Jones"],
        ],
    )
}

async fn scan_with(
    source: MemorySource,
    options: ScanOptions,
    shutdown: watch::Receiver<bool>,
) -> (Result<ScanOutcome>, String) {
    let buffer = CaptureBuffer::new();
    let reporter = Reporter::new(Box::new(buffer.clone()), ReportOptions::default());
    let orchestrator = ScanOrchestrator::new(options, reporter, shutdown).unwrap();
    let outcome = orchestrator
        .run(DataSource::Structured(Box::new(source)), "memory://test")
        .await;
    (outcome, buffer.contents())
}

async fn scan(source: MemorySource, options: ScanOptions) -> (Result<ScanOutcome>, String) {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    scan_with(source, options, shutdown_rx).await
}

fn select(selection: RuleSelection) -> ScanOptions {
    ScanOptions {
        selection,
        ..ScanOptions::default()
    }
}

fn completed(outcome: Result<ScanOutcome>) -> ScanSummary {
    match outcome {
        Ok(ScanOutcome::Completed(summary)) => summary,
        other => panic!("expected a completed scan, got {other:?}"),
    }
}

fn found(summary: &ScanSummary) -> BTreeSet<(String, String)> {
    summary
        .matches
        .iter()
        .map(|m| (m.location.clone(), m.rule_name.clone()))
        .collect()
}

#[tokio::test]
async fn test_reports_sensitive_columns() {
    let calls = Calls::default();
    let (outcome, output) = scan(users(calls.clone()), ScanOptions::default()).await;
    completed(outcome);

    assert!(output.starts_with("Found 1 table to scan, sampling 10000 rows from each...\n\n"));
    assert!(output.contains("users.email: found emails (2 rows)\n"));
    assert!(output.contains("users.phone: found phone numbers (2 rows)\n"));
    assert!(output.contains("users.last_name: found last names (2 rows)\n"));
    assert!(!output.contains("users.id:"));
    assert!(output.contains("Use --show-data to view data"));

    assert_eq!(calls.init.load(Ordering::SeqCst), 1);
    assert_eq!(calls.sample.load(Ordering::SeqCst), 1);
    assert_eq!(*calls.last_limit.lock().unwrap(), Some(10_000));
}

#[tokio::test]
async fn test_sample_size_is_passed_to_backend() {
    let calls = Calls::default();
    let options = ScanOptions {
        sample_size: 1,
        ..ScanOptions::default()
    };
    let (outcome, output) = scan(users(calls.clone()), options).await;
    let summary = completed(outcome);

    assert!(output.starts_with("Found 1 table to scan, sampling 1 row from each..."));
    assert_eq!(*calls.last_limit.lock().unwrap(), Some(1));
    assert_eq!(summary.records_scanned, 1);
}

fn addresses(calls: Calls) -> MemorySource {
    users(calls).table(
        "addresses",
        &["street_zip", "zip_code", "contact"],
        &[
            &["12345", "10115", "carol@example.org"],
            &["54321", "75001", "dave@example.org"],
        ],
    )
}

#[tokio::test]
async fn test_only_and_except_are_complementary() {
    for rule in ["email", "postal_code", "street"] {
        let all = completed(scan(addresses(Calls::default()), ScanOptions::default()).await.0);
        let only = completed(
            scan(
                addresses(Calls::default()),
                select(RuleSelection::Only(vec![rule.to_string()])),
            )
            .await
            .0,
        );
        let except = completed(
            scan(
                addresses(Calls::default()),
                select(RuleSelection::Except(vec![rule.to_string()])),
            )
            .await
            .0,
        );

        assert!(only.matches.iter().all(|m| m.rule_name == rule));
        assert!(except.matches.iter().all(|m| m.rule_name != rule));

        let (only, except) = (found(&only), found(&except));
        assert!(only.is_disjoint(&except), "{rule}: {only:?} / {except:?}");
        let union: BTreeSet<_> = only.union(&except).cloned().collect();
        assert_eq!(union, found(&all), "{rule}");
    }
}

#[tokio::test]
async fn test_ambiguous_field_name_keeps_one_owner() {
    let all = completed(scan(addresses(Calls::default()), ScanOptions::default()).await.0);
    let only = completed(
        scan(
            addresses(Calls::default()),
            select(RuleSelection::Only(vec!["postal_code".to_string()])),
        )
        .await
        .0,
    );

    let street_zip = ("addresses.street_zip".to_string(), "street".to_string());
    assert!(found(&all).contains(&street_zip));
    assert_eq!(
        found(&only),
        BTreeSet::from([("addresses.zip_code".to_string(), "postal_code".to_string())])
    );
}

#[tokio::test]
async fn test_composite_requires_both_siblings() {
    let source = MemorySource::new(Calls::default())
        .table(
            "visits",
            &["latitude", "longitude"],
            &[&["52.52", "13.40"], &["48.85", ""]],
        )
        .table("places", &["latitude", "name"], &[&["52.52", "Berlin"]]);

    let (outcome, output) = scan(source, ScanOptions::default()).await;
    let summary = completed(outcome);

    assert!(output.contains("visits.latitude+longitude: found location data (1 row)"));
    assert!(!output.contains("places.latitude"));
    assert_eq!(
        summary
            .matches
            .iter()
            .filter(|m| m.rule_name == "location")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_invalid_rule_fails_before_backend_calls() {
    let calls = Calls::default();
    let _source = users(calls.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = Reporter::new(Box::new(CaptureBuffer::new()), ReportOptions::default());

    let err = ScanOrchestrator::new(
        select(RuleSelection::Only(vec!["phone2".to_string()])),
        reporter,
        shutdown_rx,
    )
    .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Invalid rule: phone2. Valid rules are credit_card, date_of_birth, email"));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(calls.total(), 0);
}

#[tokio::test]
async fn test_invalid_rule_never_connects() {
    let mut config = PrivscanConfig::default();
    config.scan.except = Some("phone2".to_string());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = Reporter::new(Box::new(CaptureBuffer::new()), ReportOptions::default());

    // nothing listens on port 1; a connection attempt would be a connection error
    let err = run_scan("postgres://nobody@127.0.0.1:1/none", &config, reporter, shutdown_rx)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidRule { .. }));
}

#[tokio::test]
async fn test_malformed_pattern_is_distinct_from_rule_errors() {
    let reporter = Reporter::new(Box::new(CaptureBuffer::new()), ReportOptions::default());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let err = ScanOrchestrator::new(
        select(RuleSelection::Pattern("(unclosed".to_string())),
        reporter,
        shutdown_rx,
    )
    .unwrap_err();

    assert!(matches!(err, ScanError::Pattern(_)));
    assert!(err.to_string().starts_with("Invalid pattern:"));
}

#[tokio::test]
async fn test_unknown_scheme() {
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = Reporter::new(Box::new(CaptureBuffer::new()), ReportOptions::default());

    let err = run_scan("hello", &PrivscanConfig::default(), reporter, shutdown_rx)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown database scheme: hello");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_empty_discovery_is_nothing_to_scan() {
    let calls = Calls::default();
    let (outcome, output) = scan(MemorySource::new(calls.clone()), ScanOptions::default()).await;

    assert!(matches!(outcome.unwrap(), ScanOutcome::NothingToScan));
    assert_eq!(output, "Found no tables to scan\n");
    assert_eq!(calls.discover.load(Ordering::SeqCst), 1);
    assert_eq!(calls.sample.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_unit_is_the_final_error() {
    let source = users(Calls::default())
        .table("orders", &["total"], &[&["10"]])
        .failing_on("orders");

    let (outcome, output) = scan(source, ScanOptions::default()).await;

    match outcome {
        Err(ScanError::Unit { unit, .. }) => assert_eq!(unit, "orders"),
        other => panic!("expected a unit error, got {other:?}"),
    }
    assert!(!output.contains("Use --show-data to view data"));
    assert!(!output.contains("No sensitive data found"));
}

#[tokio::test]
async fn test_shutdown_skips_unstarted_units() {
    let calls = Calls::default();
    let source = users(calls.clone()).table("orders", &["total"], &[&["10"]]);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let (outcome, _) = scan_with(source, ScanOptions::default(), shutdown_rx).await;
    let summary = completed(outcome);

    assert!(summary.interrupted);
    assert_eq!(summary.units_skipped, 2);
    assert_eq!(summary.units_scanned, 0);
    assert_eq!(calls.sample.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sampling_is_serialized() {
    let calls = Calls::default();
    let source = users(calls.clone())
        .table("orders", &["total"], &[&["10"]])
        .table("items", &["sku"], &[&["A-1"]])
        .table("notes", &["body"], &[&["hello"]])
        .with_delay(Duration::from_millis(20));

    let (outcome, _) = scan(source, ScanOptions::default()).await;
    let summary = completed(outcome);

    assert_eq!(summary.units_scanned, 4);
    assert_eq!(calls.sample.load(Ordering::SeqCst), 4);
    assert_eq!(calls.peak_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_stops_queued_units() {
    let calls = Calls::default();
    let source = users(calls.clone())
        .table("orders", &["total"], &[&["10"]])
        .table("items", &["sku"], &[&["A-1"]])
        .failing_on("users")
        .failing_on("orders")
        .failing_on("items");

    let (outcome, _) = scan(source, ScanOptions::default()).await;

    assert!(matches!(outcome, Err(ScanError::Unit { .. })));
    assert_eq!(calls.sample.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_signal_after_last_unit_started_completes() {
    let calls = Calls::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let source = users(calls.clone()).signalling(shutdown_tx);

    let (outcome, output) = scan_with(source, ScanOptions::default(), shutdown_rx).await;
    let summary = completed(outcome);

    assert!(!summary.interrupted);
    assert_eq!(summary.units_skipped, 0);
    assert!(output.contains("Use --show-data to view data"));
}
