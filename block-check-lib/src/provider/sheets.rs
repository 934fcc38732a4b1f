//! Google Sheets target provider.
//!
//! Reads the domain worksheet through the Sheets values API (v4). The first
//! row is the header; rows are kept only while their `renew_month` cell is a
//! plain decimal number — anything else marks the domain as discarded.

use crate::error::BlockCheckError;
use crate::provider::TargetProvider;
use crate::types::CheckTarget;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const PROVIDER_NAME: &str = "google-sheets";

/// Credential for the Sheets API.
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    /// API key passed as the `key` query parameter
    ApiKey(String),
    /// Pre-minted OAuth bearer token passed in the Authorization header
    Bearer(String),
}

/// Response shape of `GET /v4/spreadsheets/{id}/values/{range}`.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Target provider backed by one worksheet of a Google spreadsheet.
pub struct SheetsProvider {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    auth: SheetsAuth,
}

impl SheetsProvider {
    /// Create a provider for one spreadsheet worksheet.
    pub fn new<I: Into<String>, W: Into<String>>(
        spreadsheet_id: I,
        worksheet: W,
        auth: SheetsAuth,
    ) -> crate::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                BlockCheckError::provider(
                    PROVIDER_NAME,
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            http,
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            auth,
        })
    }

    /// Point the provider at a different API host (proxies, tests).
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the Sheets API key out of an S3 object.
    ///
    /// The key material lives next to the result bucket rather than in the
    /// environment of every host that runs a check.
    pub async fn api_key_from_s3(bucket: &str, key: &str) -> crate::Result<String> {
        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = aws_sdk_s3::Client::new(&aws);

        let object = client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                BlockCheckError::provider(
                    PROVIDER_NAME,
                    format!("failed to fetch API key s3://{}/{}: {}", bucket, key, e),
                )
            })?;

        let body = object.body.collect().await.map_err(|e| {
            BlockCheckError::provider(PROVIDER_NAME, format!("failed to read API key body: {}", e))
        })?;

        String::from_utf8(body.into_bytes().to_vec())
            .map(|s| s.trim().to_string())
            .map_err(|_| {
                BlockCheckError::provider(PROVIDER_NAME, "API key object is not valid UTF-8")
            })
    }

    async fn fetch_grid(&self) -> crate::Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.worksheet
        );

        let mut request = self.http.get(&url);
        match &self.auth {
            SheetsAuth::ApiKey(key) => request = request.query(&[("key", key)]),
            SheetsAuth::Bearer(token) => request = request.bearer_auth(token),
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(BlockCheckError::provider(
                PROVIDER_NAME,
                format!(
                    "values request for '{}' returned HTTP {}",
                    self.worksheet,
                    response.status()
                ),
            ));
        }

        let parsed: ValuesResponse = response.json().await?;
        Ok(parsed.values)
    }
}

#[async_trait]
impl TargetProvider for SheetsProvider {
    async fn fetch_targets(&self) -> crate::Result<Vec<CheckTarget>> {
        let grid = self.fetch_grid().await?;
        let mut rows = grid.into_iter();

        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| BlockCheckError::provider(PROVIDER_NAME, "worksheet is empty"))?
            .iter()
            .map(|cell| cell.trim().to_lowercase())
            .collect();

        let mut targets = Vec::new();
        for row in rows {
            let record: HashMap<&str, &str> = header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect();

            if !is_active(record.get("renew_month").copied().unwrap_or("")) {
                continue;
            }
            let Some(domain) = record.get("domain").filter(|d| !d.is_empty()) else {
                continue;
            };

            targets.push(CheckTarget::new(
                domain.to_string(),
                record
                    .get("source")
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string()),
            ));
        }

        Ok(targets)
    }
}

/// A row is active while its renew month is a plain decimal number.
/// Discarded domains carry a marker like "d" in that column instead.
fn is_active(renew_month: &str) -> bool {
    !renew_month.is_empty() && renew_month.chars().all(|c| c.is_ascii_digit())
}
