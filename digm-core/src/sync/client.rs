//! HTTP client for the digm sync API
//!
//! Pushes and fetches whole session snapshots. Transient failures retry with
//! capped exponential backoff; anything else surfaces immediately.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::types::Snapshot;

/// Response from POST /v1/snapshot
#[derive(Debug, Deserialize)]
pub struct PushResponse {
    /// Server-side revision after accepting this snapshot
    pub revision: i64,
    /// Server timestamp of the write (RFC 3339)
    #[serde(default)]
    pub synced_at: Option<String>,
}

/// HTTP client for the sync API
pub struct SyncClient {
    config: SyncConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    /// Create a new sync client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required
    /// fields.
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .server_url
            .clone()
            .ok_or_else(|| Error::Config("sync.server_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Add authorization header
        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        // Add device ID header
        if let Some(device_id) = &config.device_id {
            headers.insert(
                "X-Device-ID",
                HeaderValue::from_str(device_id)
                    .map_err(|e| Error::Config(format!("invalid device_id: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Push the full snapshot to the server
    pub async fn push_snapshot(&self, snapshot: &Snapshot) -> Result<PushResponse> {
        let url = format!("{}/v1/snapshot", self.base_url);

        let request_body = PushSnapshotRequest { snapshot };

        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Sync(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let result: PushResponse = response
                .json()
                .await
                .map_err(|e| Error::Sync(format!("failed to parse response: {}", e)))?;
            Ok(result)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Sync(format!("API error ({}): {}", status, error_text)))
        }
    }

    /// Push with retry on transient failures
    ///
    /// Retries 5xx and network/timeout errors with exponential backoff.
    pub async fn push_snapshot_with_retry(&self, snapshot: &Snapshot) -> Result<PushResponse> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(500);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying push_snapshot (attempt {}/{}), waiting {:?}",
                    attempt + 1,
                    self.config.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            match self.push_snapshot(snapshot).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if is_retryable_error(&e) {
                        tracing::warn!("Transient error pushing snapshot: {}", e);
                        last_error = Some(e);
                        continue;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Sync("max retries exceeded".to_string())))
    }

    /// Fetch the server's snapshot for this device
    ///
    /// Returns None if the server has nothing for this device yet.
    pub async fn fetch_snapshot(&self) -> Result<Option<Snapshot>> {
        let url = format!("{}/v1/snapshot", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Sync(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let result: Snapshot = response
                .json()
                .await
                .map_err(|e| Error::Sync(format!("failed to parse response: {}", e)))?;
            Ok(Some(result))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Sync(format!("API error ({}): {}", status, error_text)))
        }
    }

    /// Check if the client can reach the server
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.http_client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

/// Request body for POST /v1/snapshot
#[derive(Serialize)]
struct PushSnapshotRequest<'a> {
    snapshot: &'a Snapshot,
}

/// Check if an error is retryable (transient)
fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Sync(msg) => {
            // Retry on 5xx errors
            msg.contains("50") && (msg.contains("API error") || msg.contains("HTTP"))
                // Retry on network/timeout errors
                || msg.contains("timeout")
                || msg.contains("connection")
                || msg.contains("request failed")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_config() -> SyncConfig {
        SyncConfig {
            enabled: true,
            server_url: Some("https://sync.example.com".to_string()),
            device_id: Some("test-device".to_string()),
            api_key: Some("dg_live_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_requires_valid_config() {
        let config = SyncConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(SyncClient::new(config).is_err());
    }

    #[test]
    fn test_client_with_valid_config() {
        assert!(SyncClient::new(ready_config()).is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = SyncConfig {
            server_url: Some("https://sync.example.com/".to_string()),
            ..ready_config()
        };
        let client = SyncClient::new(config).unwrap();
        assert_eq!(client.base_url, "https://sync.example.com");
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error(&Error::Sync(
            "API error (500): internal error".to_string()
        )));
        assert!(is_retryable_error(&Error::Sync(
            "HTTP request failed: timeout".to_string()
        )));
        assert!(!is_retryable_error(&Error::Sync(
            "API error (400): bad request".to_string()
        )));
        assert!(!is_retryable_error(&Error::Sync(
            "API error (401): unauthorized".to_string()
        )));
        assert!(!is_retryable_error(&Error::Validation("nope".to_string())));
    }
}
