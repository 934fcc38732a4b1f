//! A single check worker: one browser session, one chunk of targets.

use crate::collector::ResultCollector;
use crate::session::BrowserSession;
use crate::types::{CheckResult, CheckTarget};
use crate::utils::{target_url, utc_timestamp};
use tracing::{error, info, warn};

/// Check every target in `chunk`, in order, appending one result per
/// successful check to the shared collector.
///
/// Failure handling is the core resilience contract:
/// - a failed navigation or page read is logged with the target identity
///   and worker id, emits no result, and never stops the rest of the chunk
/// - a session-fatal error ends this worker early; its remaining targets
///   are abandoned without affecting any other worker
///
/// Returns only after every target has been attempted (or the session was
/// lost).
pub async fn check_chunk(
    mut session: Box<dyn BrowserSession>,
    chunk: Vec<CheckTarget>,
    worker_id: usize,
    browser_label: String,
    results: ResultCollector,
) {
    for target in chunk {
        info!(
            domain = %target.domain,
            source = target.source.as_deref().unwrap_or(""),
            worker = worker_id,
            "checking domain"
        );

        match visit(session.as_mut(), &target, &browser_label).await {
            Ok(result) => {
                if result.blocked {
                    info!(
                        domain = %target.domain,
                        title = result.page_title.as_deref().unwrap_or(""),
                        worker = worker_id,
                        "domain appears blocked"
                    );
                }
                results.push(result);
            }
            Err(e) if e.is_session_fatal() => {
                error!(
                    domain = %target.domain,
                    worker = worker_id,
                    error = %e,
                    "browser session lost, abandoning remaining targets"
                );
                return;
            }
            Err(e) => {
                warn!(
                    domain = %target.domain,
                    source = target.source.as_deref().unwrap_or(""),
                    worker = worker_id,
                    error = %e,
                    "domain check failed, skipping"
                );
            }
        }
    }
}

/// Navigate to one target and turn the page signals into a result record.
async fn visit(
    session: &mut dyn BrowserSession,
    target: &CheckTarget,
    browser_label: &str,
) -> crate::Result<CheckResult> {
    let url = target_url(&target.domain);
    session.navigate(&url).await?;
    let signal = session.inspect().await?;

    // Present-but-empty indicator text does not count as blocked
    let blocked = signal
        .block_indicator_text
        .as_deref()
        .is_some_and(|text| !text.is_empty());

    Ok(CheckResult {
        domain: target.domain.clone(),
        source: target.source.clone(),
        checked_at: utc_timestamp(),
        browser: browser_label.to_string(),
        page_title: Some(signal.title),
        block_signal_text: signal.block_indicator_text,
        blocked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{ScriptedSession, Visit};

    fn targets(domains: &[&str]) -> Vec<CheckTarget> {
        domains
            .iter()
            .map(|d| CheckTarget::new(*d, Some("sheet".to_string())))
            .collect()
    }

    async fn run_worker(script: Vec<Visit>, chunk: Vec<CheckTarget>) -> Vec<CheckResult> {
        let collector = ResultCollector::new();
        check_chunk(
            Box::new(ScriptedSession::new(script)),
            chunk,
            0,
            "test-browser".to_string(),
            collector.clone(),
        )
        .await;
        collector.into_results()
    }

    #[tokio::test]
    async fn test_clean_chunk_yields_one_result_per_target() {
        let results = run_worker(
            vec![Visit::ok("A"), Visit::ok("B"), Visit::ok("C")],
            targets(&["a.example", "b.example", "c.example"]),
        )
        .await;

        assert_eq!(results.len(), 3);
        let domains: Vec<_> = results.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, ["a.example", "b.example", "c.example"]);
        assert!(results.iter().all(|r| !r.blocked));
        assert!(results.iter().all(|r| r.browser == "test-browser"));
        assert_eq!(results[0].page_title.as_deref(), Some("A"));
        assert_eq!(results[0].source.as_deref(), Some("sheet"));
    }

    #[tokio::test]
    async fn test_failing_target_is_skipped_not_fatal() {
        let results = run_worker(
            vec![Visit::ok("A"), Visit::NavError, Visit::ok("C")],
            targets(&["a.example", "bad.example", "c.example"]),
        )
        .await;

        // Exactly the succeeding targets, in their relative order
        let domains: Vec<_> = results.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, ["a.example", "c.example"]);
    }

    #[tokio::test]
    async fn test_blocked_flag_derivation() {
        let results = run_worker(
            vec![
                Visit::blocked("Danger", "This site is blocked"),
                Visit::ok("Fine"),
            ],
            targets(&["bad.example", "ok.example"]),
        )
        .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].blocked);
        assert_eq!(
            results[0].block_signal_text.as_deref(),
            Some("This site is blocked")
        );
        assert!(!results[1].blocked);
        assert!(results[1].block_signal_text.is_none());
    }

    #[tokio::test]
    async fn test_empty_indicator_text_is_not_blocked() {
        let results = run_worker(
            vec![Visit::blocked("Odd", "")],
            targets(&["odd.example"]),
        )
        .await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].blocked);
    }

    #[tokio::test]
    async fn test_session_loss_abandons_remaining_targets() {
        let results = run_worker(
            vec![Visit::ok("A"), Visit::SessionLost, Visit::ok("C")],
            targets(&["a.example", "dead.example", "c.example"]),
        )
        .await;

        // Only the work done before the session died
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].domain, "a.example");
    }

    #[tokio::test]
    async fn test_timestamp_layout_on_results() {
        let results = run_worker(vec![Visit::ok("A")], targets(&["a.example"])).await;
        let ts = &results[0].checked_at;
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[10..11], "T");
    }
}
