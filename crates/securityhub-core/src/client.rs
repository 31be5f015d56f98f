//! HTTP client for the SecurityHub REST API.
//!
//! This module provides the transport used by the sensor pipeline: fetching
//! sensor snapshots, sending mode and sensor commands, and logging in.
//!
//! # Example
//!
//! ```no_run
//! use securityhub_core::client::ApiClient;
//! use securityhub_core::SecurityApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8000")?;
//!
//! let session = client.login("ali", "secret").await?;
//! let fetched = client.fetch_status("1", &session.token).await?;
//! println!("{} sensors in {:.1} ms", fetched.snapshot.len(), fetched.response_time_ms);
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use securityhub_types::{Mode, SensorKey, Snapshot};

use crate::error::{Error, Result};
use crate::traits::SecurityApi;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the SecurityHub API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

// ==========================================================================
// Wire Types
// ==========================================================================

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Token for the `Authorization: Token <token>` header.
    #[serde(default)]
    pub token: String,
    /// Canonical username.
    #[serde(default)]
    pub username: Option<String>,
    /// Role name (`user`, `admin`).
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the account is a superuser.
    #[serde(default)]
    pub is_superuser: bool,
    /// Numeric user id.
    #[serde(default)]
    pub user_id: Option<u64>,
}

/// Acknowledgment of a mode or sensor command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// `"success"` when the command was accepted.
    #[serde(default)]
    pub status: String,
    /// Optional server message.
    #[serde(default)]
    pub message: Option<String>,
}

impl CommandAck {
    /// A successful acknowledgment.
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    /// An acknowledgment with any other status.
    pub fn failure(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: None,
        }
    }

    /// Whether the server accepted the command.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// A parsed sensor snapshot together with the latency of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSnapshot {
    pub snapshot: Snapshot,
    /// Wall-clock latency of the request in milliseconds.
    pub response_time_ms: f64,
}

#[derive(Debug, Serialize)]
struct ModeRequest<'a> {
    mode: Mode,
    client_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SensorRequest<'a> {
    sensor_id: &'a str,
    state: bool,
    client_id: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

// ==========================================================================
// ApiClient Implementation
// ==========================================================================

impl ApiClient {
    /// Create a new client with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the API server (e.g., "http://localhost:8000")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        fallback: Option<&str>,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| Error::Network {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                if e.is_decode() {
                    Error::protocol(e)
                } else {
                    Error::Network {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| error_message(&v))
                .unwrap_or_else(|| fallback_message(status, fallback));

            Err(Error::Http {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl SecurityApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.url("/api/login/");
        let request = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password });
        let response: LoginResponse = self.send(request, &url, Some("Login failed")).await?;
        if response.token.is_empty() {
            return Err(Error::Protocol("login response has no token".to_string()));
        }
        Ok(response)
    }

    async fn fetch_status(&self, site_id: &str, token: &str) -> Result<FetchedSnapshot> {
        let url = self.url("/api/sensor-status/");
        let request = self
            .client
            .get(&url)
            .query(&[("client_id", site_id)])
            .header(AUTHORIZATION, token_header(token));

        let started = Instant::now();
        let body: serde_json::Value = self.send(request, &url, None).await?;
        let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let (snapshot, rejected) = Snapshot::from_json_partial(&body)?;
        for error in &rejected {
            warn!("Skipping unreadable reading for site {}: {}", site_id, error);
        }
        debug!(
            "Fetched {} sensor(s) for site {} in {:.1} ms",
            snapshot.len(),
            site_id,
            response_time_ms
        );
        Ok(FetchedSnapshot {
            snapshot,
            response_time_ms,
        })
    }

    async fn set_mode(&self, site_id: &str, token: &str, mode: Mode) -> Result<CommandAck> {
        let url = self.url("/api/mode/");
        let request = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token_header(token))
            .json(&ModeRequest {
                mode,
                client_id: site_id,
            });
        self.send(request, &url, None).await
    }

    async fn set_sensor(
        &self,
        site_id: &str,
        token: &str,
        sensor: &SensorKey,
        enabled: bool,
    ) -> Result<CommandAck> {
        let url = self.url("/api/sensor/");
        let request = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token_header(token))
            .json(&SensorRequest {
                sensor_id: sensor.as_str(),
                state: enabled,
                client_id: site_id,
            });
        self.send(request, &url, None).await
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    // Normalize URL (remove trailing slash)
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url)
}

fn token_header(token: &str) -> String {
    format!("Token {}", token)
}

/// Pull a human-readable message out of an error payload.
///
/// The API reports errors as `{"error": "..."}`; authentication failures
/// from the framework use `{"detail": "..."}`.
fn error_message(payload: &serde_json::Value) -> Option<String> {
    ["error", "detail"]
        .iter()
        .find_map(|field| payload.get(*field).and_then(|e| e.as_str()))
        .map(String::from)
}

fn fallback_message(status: StatusCode, fallback: Option<&str>) -> String {
    match fallback {
        Some(message) => message.to_string(),
        None => status.to_string(),
    }
}
