//! Sources that supply the list of check targets.
//!
//! The core consumes targets as an opaque, already-materialized sequence;
//! providers own everything about how that sequence is produced.

use crate::types::CheckTarget;
use async_trait::async_trait;

/// Google Sheets target source
pub mod sheets;

/// Local file target source
pub mod file;

pub use file::FileProvider;
pub use sheets::{SheetsAuth, SheetsProvider};

/// A producer of check targets.
#[async_trait]
pub trait TargetProvider: Send + Sync {
    /// Fetch the full, finite, ordered target list for one run.
    async fn fetch_targets(&self) -> crate::Result<Vec<CheckTarget>>;
}
