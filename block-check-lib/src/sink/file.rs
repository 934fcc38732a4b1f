//! Local JSONL file sink.

use crate::error::BlockCheckError;
use crate::sink::{encode_jsonl, ResultSink};
use crate::types::CheckResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Sink that writes the JSONL-encoded result batch to a local file.
///
/// Parent directories are created as needed; an existing file is replaced,
/// so each run leaves exactly one batch at the configured path.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The path this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn persist(&self, records: &[CheckResult]) -> crate::Result<()> {
        let body = encode_jsonl(records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    BlockCheckError::file_error(
                        parent.to_string_lossy(),
                        format!("failed to create result directory: {}", e),
                    )
                })?;
            }
        }

        tokio::fs::write(&self.path, body).await.map_err(|e| {
            BlockCheckError::file_error(
                self.path.to_string_lossy(),
                format!("failed to write results: {}", e),
            )
        })?;

        Ok(())
    }
}
