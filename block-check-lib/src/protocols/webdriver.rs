//! W3C WebDriver implementation of the browser-session capability.
//!
//! This module drives a chromedriver-compatible endpoint over plain HTTP:
//! one `WebDriverSession` per worker, created up front and owned
//! exclusively for the run's duration. Only the handful of endpoints a
//! check needs are implemented: session create/delete, navigate, title,
//! and element lookup for the blocking-page indicator.

use crate::error::BlockCheckError;
use crate::session::BrowserSession;
use crate::types::PageSignal;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// W3C WebDriver element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Settings for creating WebDriver sessions.
///
/// The per-navigation timeout lives here, at the capability level — the
/// aggregation engine itself imposes no deadline on a check.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the WebDriver endpoint (chromedriver, yandexdriver, ...)
    pub endpoint: String,

    /// Timeout applied to each WebDriver HTTP call
    pub nav_timeout: Duration,

    /// Tag name of the content-blocked indicator element
    pub block_indicator: String,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9515".to_string(),
            nav_timeout: Duration::from_secs(30),
            block_indicator: "safe-browsing-blocking-page".to_string(),
        }
    }
}

/// Wire envelope: every WebDriver response wraps its payload in `value`.
#[derive(Debug, Deserialize)]
struct Wire<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    message: String,
}

/// One live browser session behind a WebDriver endpoint.
///
/// Not `Clone`: the handle is moved into exactly one worker.
#[derive(Debug)]
pub struct WebDriverSession {
    http: reqwest::Client,
    endpoint: String,
    session_id: String,
    block_indicator: String,
}

impl WebDriverSession {
    /// Create a new browser session against the configured endpoint.
    ///
    /// The browser is launched with the hardening flags the checker has
    /// always run with (`--no-sandbox`, `--disable-gpu`,
    /// `--disable-dev-shm-usage`, `--allow-running-insecure-content`).
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the driver is unreachable or refuses to
    /// create a session.
    pub async fn connect(config: &WebDriverConfig) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.nav_timeout)
            .build()
            .map_err(|e| {
                BlockCheckError::session(format!("failed to create WebDriver HTTP client: {}", e))
            })?;

        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": [
                            "--no-sandbox",
                            "--allow-running-insecure-content",
                            "--disable-gpu",
                            "--disable-dev-shm-usage",
                        ]
                    }
                }
            }
        });

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let response = http
            .post(format!("{}/session", endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BlockCheckError::session(format!("WebDriver endpoint unreachable: {}", e))
            })?;

        let created: Wire<NewSession> = decode(response, "session create").await.map_err(|e| {
            // Any failure to establish a session leaves nothing to salvage
            BlockCheckError::session(e.to_string())
        })?;

        Ok(Self {
            http,
            endpoint,
            session_id: created.value.session_id,
            block_indicator: config.block_indicator.clone(),
        })
    }

    /// End the session, closing the browser window it owns.
    pub async fn close(self) -> crate::Result<()> {
        self.http
            .delete(format!("{}/session/{}", self.endpoint, self.session_id))
            .send()
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    fn session_url(&self, suffix: &str) -> String {
        format!("{}/session/{}/{}", self.endpoint, self.session_id, suffix)
    }

    /// Fetch the text of the first block-indicator element, if any exists.
    async fn block_indicator_text(&self) -> crate::Result<Option<String>> {
        let lookup = json!({
            "using": "tag name",
            "value": self.block_indicator,
        });
        let response = self
            .http
            .post(self.session_url("elements"))
            .json(&lookup)
            .send()
            .await
            .map_err(transport_error)?;
        let found: Wire<Vec<serde_json::Map<String, serde_json::Value>>> =
            decode(response, "element lookup").await?;

        let Some(element_id) = found
            .value
            .first()
            .and_then(|element| element.get(ELEMENT_KEY))
            .and_then(|id| id.as_str())
        else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.session_url(&format!("element/{}/text", element_id)))
            .send()
            .await
            .map_err(transport_error)?;
        let text: Wire<String> = decode(response, "element text").await?;
        Ok(Some(text.value))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> crate::Result<()> {
        let response = self
            .http
            .post(self.session_url("url"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(transport_error)?;
        decode::<serde_json::Value>(response, "navigate").await?;
        Ok(())
    }

    async fn inspect(&mut self) -> crate::Result<PageSignal> {
        let response = self
            .http
            .get(self.session_url("title"))
            .send()
            .await
            .map_err(transport_error)?;
        let title: Wire<String> = decode(response, "title").await?;

        Ok(PageSignal {
            title: title.value,
            block_indicator_text: self.block_indicator_text().await?,
        })
    }
}

/// Map a reqwest transport failure onto the error taxonomy.
///
/// A refused connection means the driver process is gone — session-fatal.
/// A timeout is a slow target, absorbed per-target like any other
/// navigation failure.
fn transport_error(err: reqwest::Error) -> BlockCheckError {
    if err.is_connect() {
        BlockCheckError::session(format!("WebDriver endpoint unreachable: {}", err))
    } else if err.is_timeout() {
        BlockCheckError::timeout("WebDriver command", Duration::from_secs(30))
    } else {
        BlockCheckError::network_with_source("WebDriver request failed", err.to_string())
    }
}

/// Decode a WebDriver response, turning protocol errors into our taxonomy.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation: &str,
) -> crate::Result<Wire<T>> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        // WebDriver errors carry {"value": {"error", "message"}}
        if let Ok(wire) = serde_json::from_str::<Wire<WireError>>(&body) {
            if wire.value.error == "invalid session id" {
                return Err(BlockCheckError::session(wire.value.message));
            }
            return Err(BlockCheckError::navigation(
                operation,
                format!("{}: {}", wire.value.error, wire.value.message),
            ));
        }
        return Err(BlockCheckError::navigation(
            operation,
            format!("HTTP {}", status),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        BlockCheckError::ParseError {
            message: format!("malformed WebDriver response for {}: {}", operation, e),
        }
    })
}
