//! # Block Check Library
//!
//! A library for batch-checking whether domains are blocked or flagged by a
//! browser's content-filtering mechanism.
//!
//! A run takes a list of check targets from a [`TargetProvider`], splits it
//! into balanced chunks for a fixed pool of browser sessions, drives every
//! session concurrently with per-target failure isolation, and hands the
//! aggregated results to a [`ResultSink`] for durable storage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use block_check_lib::{BlockChecker, FileProvider, FileSink, RunConfig};
//! use block_check_lib::{BrowserSession, WebDriverConfig, WebDriverSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default().with_workers(4);
//!     let driver = WebDriverConfig::default();
//!
//!     let mut sessions: Vec<Box<dyn BrowserSession>> = Vec::new();
//!     for _ in 0..config.workers {
//!         sessions.push(Box::new(WebDriverSession::connect(&driver).await?));
//!     }
//!
//!     let provider = FileProvider::new("targets.txt");
//!     let sink = FileSink::new("results.jsonl");
//!
//!     let report = BlockChecker::with_config(config)
//!         .run(&provider, sessions, &sink)
//!         .await?;
//!     println!("checked {} domains", report.results_collected);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Balanced partitioning**: every target checked exactly once, chunk
//!   sizes differ by at most one
//! - **Per-target isolation**: one unreachable domain never aborts the rest
//!   of a worker's chunk
//! - **Exclusive sessions**: a browser session is owned by exactly one
//!   worker for the whole run
//! - **Best-effort aggregation**: whatever was collected is always offered
//!   to the sink, even after partial worker loss

// Re-export main public API types and functions
pub use checker::BlockChecker;
pub use collector::ResultCollector;
pub use config::{
    load_env_config, merge_configs, parse_timeout_string, ConfigManager, DefaultsConfig,
    FileConfig, SourceConfig, UploadConfig,
};
pub use error::BlockCheckError;
pub use partition::partition;
pub use pool::run_all;
pub use protocols::webdriver::{WebDriverConfig, WebDriverSession};
pub use provider::{FileProvider, SheetsAuth, SheetsProvider, TargetProvider};
pub use session::BrowserSession;
pub use sink::{encode_jsonl, FileSink, ResultSink, S3Sink};
pub use types::{CheckResult, CheckTarget, PageSignal, RunConfig, RunReport};

// Internal modules - these are not part of the public API
mod checker;
mod collector;
mod config;
mod error;
mod partition;
mod pool;
mod protocols;
mod provider;
mod session;
mod sink;
mod types;
mod utils;
mod worker;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, BlockCheckError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
