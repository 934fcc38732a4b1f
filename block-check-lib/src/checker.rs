//! Full-run orchestration: provider → worker pool → sink.

use crate::pool::run_all;
use crate::provider::TargetProvider;
use crate::session::BrowserSession;
use crate::sink::ResultSink;
use crate::types::{RunConfig, RunReport};
use tracing::{error, info};

/// Coordinates one complete check run.
///
/// The checker owns the run configuration and wires the external
/// collaborators together: it fetches targets from a provider, drives the
/// pool over the supplied sessions, and always offers whatever was
/// collected to the sink — even when some or most targets failed. A sink
/// failure is folded into the report, never raised.
///
/// # Example
///
/// ```rust,no_run
/// use block_check_lib::{BlockChecker, BrowserSession, FileProvider, FileSink, RunConfig};
///
/// # async fn run(sessions: Vec<Box<dyn BrowserSession>>) -> block_check_lib::Result<()> {
/// let checker = BlockChecker::with_config(RunConfig::default().with_workers(4));
/// let provider = FileProvider::new("targets.txt");
/// let sink = FileSink::new("results.jsonl");
///
/// let report = checker.run(&provider, sessions, &sink).await?;
/// println!("persisted: {}", report.persisted);
/// # Ok(())
/// # }
/// ```
pub struct BlockChecker {
    /// Configuration settings for this checker instance
    config: RunConfig,
}

impl BlockChecker {
    /// Create a new checker with default configuration (10 workers).
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
        }
    }

    /// Create a new checker with custom configuration.
    pub fn with_config(config: RunConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one full run: fetch targets, check them across the sessions,
    /// persist the aggregated results.
    ///
    /// The number of sessions must equal the configured worker count.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider fails (there is nothing to check)
    /// or on a pool precondition violation. Per-target failures, worker
    /// loss, and sink failures do not error — they show up in the report as
    /// a reduced `results_collected` or `persisted: false`.
    pub async fn run<P, S>(
        &self,
        provider: &P,
        sessions: Vec<Box<dyn BrowserSession>>,
        sink: &S,
    ) -> crate::Result<RunReport>
    where
        P: TargetProvider + ?Sized,
        S: ResultSink + ?Sized,
    {
        let targets = provider.fetch_targets().await?;
        let targets_total = targets.len();
        info!(targets = targets_total, workers = sessions.len(), "starting check run");

        let results = run_all(sessions, targets, &self.config).await?;
        let blocked_count = results.iter().filter(|r| r.blocked).count();
        info!(
            collected = results.len(),
            blocked = blocked_count,
            "checking finished"
        );

        let persisted = match sink.persist(&results).await {
            Ok(()) => {
                info!(records = results.len(), "upload finished successfully");
                true
            }
            Err(e) => {
                error!(error = %e, "upload failed");
                false
            }
        };

        Ok(RunReport {
            targets_total,
            results_collected: results.len(),
            blocked_count,
            persisted,
        })
    }
}

impl Default for BlockChecker {
    fn default() -> Self {
        Self::new()
    }
}
