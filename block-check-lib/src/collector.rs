//! The shared result collector all workers append into.

use crate::types::CheckResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only collection of check results, shared across all workers for
/// the lifetime of one run.
///
/// Results from different workers interleave in completion order; no
/// cross-worker ordering is guaranteed. Cloning the collector yields another
/// handle to the same underlying collection. At run end the coordinator
/// takes ownership of the accumulated results via [`ResultCollector::into_results`].
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    inner: Arc<Mutex<Vec<CheckResult>>>,
}

impl ResultCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one result. Safe to call from any worker concurrently.
    pub fn push(&self, result: CheckResult) {
        self.inner.lock().push(result);
    }

    /// Number of results collected so far.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the collection is still empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Take ownership of the collected results.
    ///
    /// Intended for the coordinator after all workers have terminated. If
    /// another handle is somehow still alive the contents are cloned out
    /// instead.
    pub fn into_results(self) -> Vec<CheckResult> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner(),
            Err(arc) => arc.lock().clone(),
        }
    }
}
