//! The browser-session capability a worker drives.

use crate::types::PageSignal;
use async_trait::async_trait;

/// One browser-driver handle.
///
/// A session is not safe for concurrent use: it is owned exclusively by a
/// single worker for the run's whole duration. The `&mut self` receivers and
/// the boxed, non-clonable handles the pool hands out enforce that at the
/// type level — a session is moved into its worker and never crosses unit
/// boundaries.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the browser to `url`.
    ///
    /// May block for unbounded wall-clock time; any per-check timeout is the
    /// implementation's own concern.
    async fn navigate(&mut self, url: &str) -> crate::Result<()>;

    /// Read back the page title and the content-blocked indicator, if shown.
    async fn inspect(&mut self) -> crate::Result<PageSignal>;
}
