//! The worker pool coordinator: one task per session, one chunk each.

use crate::collector::ResultCollector;
use crate::error::BlockCheckError;
use crate::partition::partition;
use crate::session::BrowserSession;
use crate::types::{CheckResult, CheckTarget, RunConfig};
use crate::worker::check_chunk;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Run the full target list across the given sessions and return the
/// aggregated results.
///
/// The targets are partitioned into `sessions.len()` chunks; each session is
/// moved into its own task together with its chunk and a handle to one
/// shared collector. The call blocks until every worker has reached a
/// terminal state, then hands back whatever was collected.
///
/// Workers are not supervised: a unit that dies early (catastrophic session
/// loss) contributes a partial or empty chunk, and the run still completes
/// with the other workers' results. No retry, no chunk redistribution, no
/// cancellation.
///
/// # Errors
///
/// Returns `ConfigError` when the pool is empty or when the configured
/// worker count disagrees with the number of sessions supplied — both are
/// caller contract violations, detected before any check starts.
pub async fn run_all(
    sessions: Vec<Box<dyn BrowserSession>>,
    targets: Vec<CheckTarget>,
    config: &RunConfig,
) -> crate::Result<Vec<CheckResult>> {
    if sessions.is_empty() {
        return Err(BlockCheckError::config("worker pool has no sessions"));
    }
    if sessions.len() != config.workers {
        return Err(BlockCheckError::config(format!(
            "configured for {} workers but {} sessions supplied",
            config.workers,
            sessions.len()
        )));
    }

    let chunks = partition(&targets, sessions.len())?;
    let collector = ResultCollector::new();

    let mut units = JoinSet::new();
    for (worker_id, (session, chunk)) in sessions.into_iter().zip(chunks).enumerate() {
        debug!(worker = worker_id, targets = chunk.len(), "starting worker");
        units.spawn(check_chunk(
            session,
            chunk,
            worker_id,
            config.browser_label.clone(),
            collector.clone(),
        ));
    }

    // One blocking join: every unit reaches a terminal state before the
    // collection is read. A panicked unit is absorbed like a dead session —
    // its remaining chunk is lost, the run proceeds.
    while let Some(joined) = units.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "worker task terminated abnormally");
        }
    }

    Ok(collector.into_results())
}
