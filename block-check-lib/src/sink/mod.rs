//! Destinations for the aggregated result collection.

use crate::types::CheckResult;
use async_trait::async_trait;

/// S3 result sink
pub mod s3;

/// Local JSONL file sink
pub mod file;

pub use file::FileSink;
pub use s3::S3Sink;

/// A destination that durably stores one run's results.
///
/// The core hands over the full collection exactly once per run, even when
/// it is empty. Retrying is the sink's own responsibility.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the result batch.
    async fn persist(&self, records: &[CheckResult]) -> crate::Result<()>;
}

/// Render results as JSON Lines: one self-describing record per line.
pub fn encode_jsonl(records: &[CheckResult]) -> crate::Result<String> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(domain: &str, blocked: bool) -> CheckResult {
        CheckResult {
            domain: domain.to_string(),
            source: Some("sheet".to_string()),
            checked_at: "2026-01-02T03:04:05".to_string(),
            browser: "yandex-browser".to_string(),
            page_title: Some("title".to_string()),
            block_signal_text: blocked.then(|| "blocked".to_string()),
            blocked,
        }
    }

    #[test]
    fn test_encode_jsonl_one_record_per_line() {
        let encoded = encode_jsonl(&[result("a.example", false), result("b.example", true)]).unwrap();

        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["domain"], "a.example");
        assert_eq!(first["blocked"], false);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["blocked"], true);
        assert_eq!(second["block_signal_text"], "blocked");
    }

    #[test]
    fn test_encode_jsonl_empty_batch() {
        assert_eq!(encode_jsonl(&[]).unwrap(), "");
    }
}
