//! HTTP Backend Implementation
//!
//! Guidance backend for the First-Aid Buddy REST service.
//!
//! # Service API
//!
//! - `POST /chat` - one exchange: `{message, session_id, region}` in,
//!   `{answer, is_emergency, emergency_number, citations, ...}` out
//! - `GET /health` - liveness probe
//!
//! Error responses carry a `detail` field, either a string or a list of
//! validation entries with a `msg` each.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::traits::{
    validate_request, BackendConfig, ChatRequest, ChatResponse, GuidanceBackend, TransportError,
};

/// HTTP backend client
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create from `BackendConfig`
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &BackendConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get chat endpoint URL
    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    /// Get health endpoint URL
    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Pull a readable message out of an error body
///
/// Falls back to the status reason phrase when the body carries no usable
/// `detail`.
pub(crate) fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|data| {
            let detail = data.get("detail")?;
            match detail {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Array(entries) => {
                    let msgs: Vec<&str> = entries
                        .iter()
                        .filter_map(|e| e.get("msg").and_then(serde_json::Value::as_str))
                        .collect();
                    (!msgs.is_empty()).then(|| msgs.join("; "))
                }
                _ => None,
            }
        })
        .filter(|d| !d.trim().is_empty());

    from_json.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map_or_else(|| "request failed".to_string(), String::from)
    })
}

#[async_trait]
impl GuidanceBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        validate_request(request)?;
        let start = Instant::now();

        let response = self
            .http_client
            .post(self.chat_url())
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            let detail = error_detail(status, &body);
            tracing::warn!(status = status.as_u16(), detail = %detail, "Chat request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let decoded: ChatResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            server_ms = decoded.processing_ms,
            "Chat response decoded"
        );

        Ok(decoded)
    }
}
