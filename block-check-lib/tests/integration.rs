// block-check-lib/tests/integration.rs

//! Integration tests for the public run pipeline: partition → concurrent
//! check → aggregate → persist, exercised over scripted collaborators.

use async_trait::async_trait;
use block_check_lib::{
    partition, run_all, BlockCheckError, BlockChecker, BrowserSession, CheckResult, CheckTarget,
    PageSignal, ResultSink, RunConfig, TargetProvider,
};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================
// Scripted collaborators
// ============================================================

/// Session that reports every page as clean, or every navigation as failed.
struct StubSession {
    fail_navigation: bool,
    blocked_text: Option<String>,
}

impl StubSession {
    fn clean() -> Box<dyn BrowserSession> {
        Box::new(Self {
            fail_navigation: false,
            blocked_text: None,
        })
    }

    fn broken() -> Box<dyn BrowserSession> {
        Box::new(Self {
            fail_navigation: true,
            blocked_text: None,
        })
    }

    fn blocking(text: &str) -> Box<dyn BrowserSession> {
        Box::new(Self {
            fail_navigation: false,
            blocked_text: Some(text.to_string()),
        })
    }
}

#[async_trait]
impl BrowserSession for StubSession {
    async fn navigate(&mut self, url: &str) -> block_check_lib::Result<()> {
        if self.fail_navigation {
            Err(BlockCheckError::navigation(url, "stubbed navigation failure"))
        } else {
            Ok(())
        }
    }

    async fn inspect(&mut self) -> block_check_lib::Result<PageSignal> {
        Ok(PageSignal {
            title: "stub page".to_string(),
            block_indicator_text: self.blocked_text.clone(),
        })
    }
}

struct StaticProvider {
    targets: Vec<CheckTarget>,
}

#[async_trait]
impl TargetProvider for StaticProvider {
    async fn fetch_targets(&self) -> block_check_lib::Result<Vec<CheckTarget>> {
        Ok(self.targets.clone())
    }
}

/// Sink that records what it was asked to persist.
#[derive(Clone, Default)]
struct RecordingSink {
    batches: Arc<Mutex<Vec<Vec<CheckResult>>>>,
    fail: bool,
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn persist(&self, records: &[CheckResult]) -> block_check_lib::Result<()> {
        self.batches.lock().push(records.to_vec());
        if self.fail {
            Err(BlockCheckError::storage("recording-sink", "stubbed failure"))
        } else {
            Ok(())
        }
    }
}

fn targets(n: usize) -> Vec<CheckTarget> {
    (0..n)
        .map(|i| CheckTarget::new(format!("d{}.example", i), Some("sheet".to_string())))
        .collect()
}

fn sessions(n: usize) -> Vec<Box<dyn BrowserSession>> {
    (0..n).map(|_| StubSession::clean()).collect()
}

// ============================================================
// Partitioning
// ============================================================

#[test]
fn test_partition_23_targets_into_10_balanced_chunks() {
    let items = targets(23);
    let chunks = partition(&items, 10).unwrap();

    assert_eq!(chunks.len(), 10);
    assert!(chunks.iter().all(|c| c.len() == 2 || c.len() == 3));
    assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 23);

    let rejoined: Vec<CheckTarget> = chunks.into_iter().flatten().collect();
    assert_eq!(rejoined, items, "concatenation reproduces input order");
}

#[test]
fn test_partition_empty_list_into_5_empty_chunks() {
    let chunks = partition(&targets(0), 5).unwrap();
    assert_eq!(chunks.len(), 5);
    assert!(chunks.iter().all(Vec::is_empty));
}

// ============================================================
// Coordinator
// ============================================================

#[tokio::test]
async fn test_zero_failure_run_collects_all_targets() {
    let config = RunConfig::default().with_workers(10);
    let results = run_all(sessions(10), targets(23), &config).await.unwrap();
    assert_eq!(results.len(), 23);
}

#[tokio::test]
async fn test_broken_session_excludes_only_its_chunk() {
    let config = RunConfig::default().with_workers(4);
    // Worker 2's session throws on every navigate call
    let pool: Vec<Box<dyn BrowserSession>> = vec![
        StubSession::clean(),
        StubSession::clean(),
        StubSession::broken(),
        StubSession::clean(),
    ];

    let results = run_all(pool, targets(20), &config).await.unwrap();

    // 20 targets over 4 workers: chunks of 5; worker 2 owned d10..d14
    assert_eq!(results.len(), 15);
    for lost in 10..15 {
        let domain = format!("d{}.example", lost);
        assert!(results.iter().all(|r| r.domain != domain));
    }
}

#[tokio::test]
async fn test_blocked_page_signal_flows_into_results() {
    let config = RunConfig::default().with_workers(1);
    let pool = vec![StubSession::blocking("Access restricted by policy")];

    let results = run_all(pool, targets(3), &config).await.unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        assert!(result.blocked);
        assert_eq!(
            result.block_signal_text.as_deref(),
            Some("Access restricted by policy")
        );
        assert_eq!(result.browser, "yandex-browser");
    }
}

// ============================================================
// Full run through BlockChecker
// ============================================================

#[tokio::test]
async fn test_full_run_persists_collected_results() {
    let checker = BlockChecker::with_config(RunConfig::default().with_workers(3));
    let provider = StaticProvider { targets: targets(8) };
    let sink = RecordingSink::default();

    let report = checker.run(&provider, sessions(3), &sink).await.unwrap();

    assert_eq!(report.targets_total, 8);
    assert_eq!(report.results_collected, 8);
    assert_eq!(report.blocked_count, 0);
    assert!(report.persisted);

    let batches = sink.batches.lock();
    assert_eq!(batches.len(), 1, "sink invoked exactly once");
    assert_eq!(batches[0].len(), 8);
}

#[tokio::test]
async fn test_empty_run_still_invokes_sink() {
    let checker = BlockChecker::with_config(RunConfig::default().with_workers(5));
    let provider = StaticProvider { targets: Vec::new() };
    let sink = RecordingSink::default();

    let report = checker.run(&provider, sessions(5), &sink).await.unwrap();

    assert_eq!(report.results_collected, 0);
    assert!(report.persisted);
    assert_eq!(sink.batches.lock()[0].len(), 0);
}

#[tokio::test]
async fn test_sink_failure_is_reported_not_raised() {
    let checker = BlockChecker::with_config(RunConfig::default().with_workers(2));
    let provider = StaticProvider { targets: targets(4) };
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };

    let report = checker.run(&provider, sessions(2), &sink).await.unwrap();

    assert_eq!(report.results_collected, 4);
    assert!(!report.persisted, "upload failure surfaces as a boolean");
}

#[tokio::test]
async fn test_partial_loss_still_persists_the_rest() {
    let checker = BlockChecker::with_config(RunConfig::default().with_workers(3));
    let provider = StaticProvider { targets: targets(9) };
    let sink = RecordingSink::default();
    let pool: Vec<Box<dyn BrowserSession>> = vec![
        StubSession::clean(),
        StubSession::broken(),
        StubSession::clean(),
    ];

    let report = checker.run(&provider, pool, &sink).await.unwrap();

    assert_eq!(report.targets_total, 9);
    assert_eq!(report.results_collected, 6);
    assert!(report.persisted);
    assert_eq!(sink.batches.lock()[0].len(), 6);
}

#[tokio::test]
async fn test_session_count_mismatch_fails_fast() {
    let checker = BlockChecker::with_config(RunConfig::default().with_workers(4));
    let provider = StaticProvider { targets: targets(4) };
    let sink = RecordingSink::default();

    let err = checker.run(&provider, sessions(2), &sink).await.unwrap_err();
    assert!(matches!(err, BlockCheckError::ConfigError { .. }));
    assert!(sink.batches.lock().is_empty(), "nothing persisted on precondition failure");
}
