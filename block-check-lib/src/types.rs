//! Core data types for batch domain block-checking.
//!
//! This module defines the main data structures used throughout the library:
//! check targets, per-check results, run configuration, and the final run
//! report.

use serde::{Deserialize, Serialize};

/// A single domain to check, plus its provenance tag.
///
/// Targets are immutable once produced by a provider. Uniqueness is not
/// enforced — a domain listed twice is checked twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTarget {
    /// The bare domain name (e.g., "example.com"), without a scheme
    pub domain: String,

    /// Where the domain came from (spreadsheet tag, feed name, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CheckTarget {
    /// Create a new check target.
    pub fn new<D: Into<String>>(domain: D, source: Option<String>) -> Self {
        Self {
            domain: domain.into(),
            source,
        }
    }
}

/// What a browser session reads back after navigating to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSignal {
    /// The page title, informational only
    pub title: String,

    /// Text of the content-blocked indicator element, when present
    pub block_indicator_text: Option<String>,
}

/// Result of checking a single domain.
///
/// Created by a worker after one target check completes. A failed check
/// produces no `CheckResult` at all, only a log event. Serialized one per
/// line as a self-describing JSON record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// The domain that was checked
    pub domain: String,

    /// Provenance tag carried over from the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// UTC timestamp of the check, second precision (`YYYY-MM-DDTHH:MM:SS`)
    pub checked_at: String,

    /// Label of the browser that performed the check
    pub browser: String,

    /// Title of the page the browser landed on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,

    /// Text of the blocking-page indicator, when one was shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_signal_text: Option<String>,

    /// Whether the destination was flagged by the content filter
    pub blocked: bool,
}

/// Configuration for one check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of concurrent workers; one exclusive browser session each.
    /// Default: 10, Range: 1-100
    pub workers: usize,

    /// Browser label stamped into every result record
    pub browser_label: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            browser_label: "yandex-browser".to_string(),
        }
    }
}

impl RunConfig {
    /// Create a new configuration with a custom worker count.
    ///
    /// Automatically caps the count at 100 to prevent resource exhaustion.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, 100);
        self
    }

    /// Set the browser label stamped into result records.
    pub fn with_browser_label<L: Into<String>>(mut self, label: L) -> Self {
        self.browser_label = label.into();
        self
    }
}

/// Outcome of a full run: partition, check, aggregate, persist.
///
/// A run "completes" even when individual targets failed or a worker lost
/// its session; only the persistence outcome is surfaced separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// How many targets the provider supplied
    pub targets_total: usize,

    /// How many results were collected (targets minus failed checks)
    pub results_collected: usize,

    /// How many collected results were flagged as blocked
    pub blocked_count: usize,

    /// Whether the sink durably stored the result batch
    pub persisted: bool,
}
