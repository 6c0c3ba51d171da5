//! Guidance Service Integration
//!
//! This module provides access to the first-aid guidance service through a
//! common trait interface.
//!
//! # Available Backends
//!
//! - **HTTP**: the REST service (default)
//! - **Scripted**: pre-authored replies for tests and offline demos
//!
//! # Usage
//!
//! ```ignore
//! use buddy_conductor::backend::{ChatRequest, GuidanceBackend, HttpBackend};
//!
//! let backend = HttpBackend::new("http://localhost:8000", None)?;
//! let request = ChatRequest::new("Someone is choking", session_id, Region::Uk);
//! let response = backend.send(&request).await?;
//! ```

mod http;
pub mod scripted;
mod traits;

pub use http::HttpBackend;
pub use scripted::{ReplyGate, ScriptedBackend, ScriptedReply};
pub use traits::{BackendConfig, ChatRequest, ChatResponse, GuidanceBackend, TransportError};
