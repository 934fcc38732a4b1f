//! Error handling for block-check operations.
//!
//! This module defines a comprehensive error type that covers the different
//! ways a check run can fail, from a misconfigured worker pool to a lost
//! browser session.

use std::fmt;

/// Main error type for block-check operations.
///
/// The variants mirror the failure tiers of a run: fatal preconditions
/// (configuration), external collaborators (provider, storage), the browser
/// session itself, and the per-target navigation path that is absorbed
/// inside a worker.
#[derive(Debug, Clone)]
pub enum BlockCheckError {
    /// Configuration errors (invalid worker count, conflicting settings)
    ConfigError {
        message: String,
    },

    /// Target provider failures (spreadsheet fetch, malformed rows)
    ProviderError {
        provider: String,
        message: String,
    },

    /// The browser session became unusable (crashed driver, dead session id)
    SessionError {
        message: String,
    },

    /// A single navigation or page read failed; the target is skipped
    NavigationError {
        url: String,
        message: String,
    },

    /// JSON parsing errors for wire responses
    ParseError {
        message: String,
    },

    /// Network-related errors (connection, DNS, TLS)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Result persistence failures (upload rejected, write error)
    StorageError {
        target: String,
        message: String,
    },

    /// File I/O errors when reading target lists or configuration
    FileError {
        path: String,
        message: String,
    },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl BlockCheckError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new provider error.
    pub fn provider<P: Into<String>, M: Into<String>>(provider: P, message: M) -> Self {
        Self::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new session error.
    pub fn session<M: Into<String>>(message: M) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    /// Create a new navigation error.
    pub fn navigation<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::NavigationError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new storage error.
    pub fn storage<T: Into<String>, M: Into<String>>(target: T, message: M) -> Self {
        Self::StorageError {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error means the browser session itself is gone.
    ///
    /// A worker that sees a session-fatal error stops checking its remaining
    /// chunk; any other error only skips the current target.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::SessionError { .. })
    }
}

impl fmt::Display for BlockCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::ProviderError { provider, message } => {
                write!(f, "Provider error ({}): {}", provider, message)
            }
            Self::SessionError { message } => {
                write!(f, "Browser session error: {}", message)
            }
            Self::NavigationError { url, message } => {
                write!(f, "Navigation error for '{}': {}", url, message)
            }
            Self::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::StorageError { target, message } => {
                write!(f, "Storage error for '{}': {}", target, message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for BlockCheckError {}

// Implement From conversions for common error types
impl From<reqwest::Error> for BlockCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("HTTP request", std::time::Duration::from_secs(30))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for BlockCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<std::io::Error> for BlockCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fatal_classification() {
        assert!(BlockCheckError::session("driver gone").is_session_fatal());
        assert!(!BlockCheckError::navigation("https://a.example", "net error").is_session_fatal());
        assert!(!BlockCheckError::network("refused").is_session_fatal());
        assert!(!BlockCheckError::config("bad workers").is_session_fatal());
    }

    #[test]
    fn test_display_includes_context() {
        let err = BlockCheckError::navigation("https://a.example", "dns failure");
        let text = err.to_string();
        assert!(text.contains("https://a.example"));
        assert!(text.contains("dns failure"));

        let err = BlockCheckError::storage("s3://bucket/key", "access denied");
        assert!(err.to_string().contains("s3://bucket/key"));
    }
}
