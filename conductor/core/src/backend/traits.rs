//! Guidance Backend Traits
//!
//! Trait definitions for the first-aid guidance service. The conductor talks
//! to the service through [`GuidanceBackend`] only, so the HTTP client can be
//! swapped for a scripted one in tests without touching the state machine.
//!
//! # Contract
//!
//! One call is one attempt: no retry, no caching, no side effects beyond the
//! outbound request. Every failure is reported as a [`TransportError`] that
//! carries a message fit to show the user.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::{Citation, SessionId};
use crate::region::Region;

/// One exchange as sent to the service
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Trimmed user input or quick-action text
    pub message: String,
    /// Session the exchange belongs to
    pub session_id: SessionId,
    /// Region selected when the request was built
    pub region: Region,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(message: impl Into<String>, session_id: SessionId, region: Region) -> Self {
        Self {
            message: message.into(),
            session_id,
            region,
        }
    }
}

/// Decoded service response
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Guidance text, passed through to the renderer unmodified
    pub answer: String,
    /// Whether the situation was classified as life-threatening
    pub is_emergency: bool,
    /// Jurisdiction emergency number (may be omitted)
    #[serde(default)]
    pub emergency_number: Option<String>,
    /// Supporting sources in service order
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Echo of the request's session id
    #[serde(default)]
    pub session_id: Option<String>,
    /// Server-side processing time
    #[serde(default)]
    pub processing_ms: Option<f64>,
}

impl ChatResponse {
    /// A non-emergency answer without citations
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            is_emergency: false,
            emergency_number: None,
            citations: Vec::new(),
            session_id: None,
            processing_ms: None,
        }
    }

    /// Flag the answer as an emergency with the given number
    #[must_use]
    pub fn with_emergency(mut self, number: Option<&str>) -> Self {
        self.is_emergency = true;
        self.emergency_number = number.map(String::from);
        self
    }

    /// Attach a citation
    #[must_use]
    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }
}

/// Failure of a single transport call
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransportError {
    /// The service could not be reached
    #[error("Could not reach the first-aid service: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("The first-aid service returned an error ({status}): {detail}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Detail supplied by the service, or the reason phrase
        detail: String,
    },

    /// The body could not be decoded into a response
    #[error("Unexpected response from the first-aid service: {0}")]
    Decode(String),

    /// The request violated the input contract and was never sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The call ended without producing a result
    #[error("The request ended before a response arrived")]
    Aborted,
}

impl TransportError {
    /// The message shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Guidance backend trait
///
/// Implement this trait to add a new way of reaching the guidance service.
#[async_trait]
pub trait GuidanceBackend: Send + Sync {
    /// Backend name for logs (e.g. "HTTP", "Scripted")
    fn name(&self) -> &str;

    /// Check if the service is reachable and healthy
    async fn health_check(&self) -> bool;

    /// Perform one request/response exchange
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Reject requests whose message is empty after trimming
pub(crate) fn validate_request(request: &ChatRequest) -> Result<(), TransportError> {
    if request.message.trim().is_empty() {
        return Err(TransportError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Backend connection configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the service; the chat endpoint is `<base_url>/chat`
    pub base_url: String,
    /// Per-request timeout (`None` = wait indefinitely)
    pub timeout: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: None,
        }
    }
}

impl BackendConfig {
    /// Create configuration for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest::new(
            "small cut on finger",
            SessionId("sess_abc".to_string()),
            Region::Us,
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "small cut on finger",
                "session_id": "sess_abc",
                "region": "US",
            })
        );
    }

    #[test]
    fn test_response_decodes_full_shape() {
        let body = r#"{
            "answer": "Call now",
            "is_emergency": true,
            "emergency_number": "999",
            "citations": [{"title": "NHS Choking", "snippet": "Back blows"}],
            "session_id": "sess_abc",
            "processing_ms": 812.4
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(response.is_emergency);
        assert_eq!(response.emergency_number.as_deref(), Some("999"));
        assert_eq!(
            response.citations,
            vec![Citation::new("NHS Choking", "Back blows")]
        );
        assert_eq!(response.session_id.as_deref(), Some("sess_abc"));
    }

    #[test]
    fn test_response_optional_fields_default() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"answer": "Rest", "is_emergency": false}"#).unwrap();
        assert_eq!(response, ChatResponse::answer("Rest"));
    }

    #[test]
    fn test_response_missing_required_field_fails() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"answer": "Rest"}"#).is_err());
    }

    #[test]
    fn test_validate_request_rejects_whitespace() {
        let request = ChatRequest::new("   ", SessionId::generate(), Region::Uk);
        assert!(matches!(
            validate_request(&request),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_transport_error_messages() {
        let err = TransportError::Status {
            status: 503,
            detail: "AI service is not configured".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "The first-aid service returned an error (503): AI service is not configured"
        );
    }
}
