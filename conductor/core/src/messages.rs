//! Conversation Primitives
//!
//! Identifiers, roles and the small value types shared by every layer of the
//! conductor: the transport decodes into them, the conversation store holds
//! them, and UI surfaces render them.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Message identifier
///
/// Allocated from a process-wide counter, so ids are unique and increase in
/// append order within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg_{}", self.0)
    }
}

/// Opaque session identifier
///
/// Generated once when a conversation view is created and sent unchanged with
/// every request. Format: `sess_` followed by nine base-36 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

const SESSION_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 9;

impl SessionId {
    /// Generate a new random session ID
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SESSION_SUFFIX_LEN)
            .map(|_| SESSION_ALPHABET[rng.gen_range(0..SESSION_ALPHABET.len())] as char)
            .collect();
        Self(format!("sess_{suffix}"))
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input (typed or quick action)
    User,
    /// Guidance returned by the service
    Assistant,
}

/// A knowledge-base reference supporting an assistant answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Short label of the source document, e.g. "Burns (Minor)"
    pub title: String,
    /// Excerpt of the matched passage
    pub snippet: String,
}

impl Citation {
    /// Create a citation
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Submission state of the conductor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Ready to accept a submission
    #[default]
    Idle,
    /// One exchange is in flight; further submissions are ignored
    AwaitingResponse,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::AwaitingResponse => "Thinking...",
        }
    }

    /// Whether input affordances should be enabled
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
