//! Local-file target provider.

use crate::error::BlockCheckError;
use crate::provider::TargetProvider;
use crate::types::CheckTarget;
use async_trait::async_trait;
use std::path::PathBuf;

/// Target provider backed by a plain text file.
///
/// One target per line, `domain` or `domain,source`. Blank lines and lines
/// starting with `#` are ignored.
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    /// Create a provider reading from `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TargetProvider for FileProvider {
    async fn fetch_targets(&self) -> crate::Result<Vec<CheckTarget>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BlockCheckError::file_error(
                self.path.to_string_lossy(),
                format!("failed to read target list: {}", e),
            )
        })?;

        let mut targets = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (domain, source) = match line.split_once(',') {
                Some((domain, source)) => (domain.trim(), Some(source.trim())),
                None => (line, None),
            };
            if domain.is_empty() {
                continue;
            }

            targets.push(CheckTarget::new(
                domain,
                source.filter(|s| !s.is_empty()).map(String::from),
            ));
        }

        Ok(targets)
    }
}
