//! Session and Conversation Store
//!
//! A session is one conversation view: an identifier generated at creation,
//! the region selector, and the ordered message log that surfaces render.
//!
//! # Store Invariants
//!
//! - Messages are only ever appended; append order is display order.
//! - A message never changes after it is appended.
//! - The only removal is [`Conversation::clear`], which replaces the whole log.
//! - Emergency data and citations exist only on assistant messages, and an
//!   emergency number only when the message is flagged as an emergency.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::ChatResponse;
use crate::messages::{Citation, MessageId, MessageRole, SessionId};
use crate::region::Region;

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationMessage {
    id: MessageId,
    role: MessageRole,
    content: String,
    is_emergency: bool,
    emergency_number: Option<String>,
    citations: Vec<Citation>,
    created_at: DateTime<Utc>,
}

impl ConversationMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            is_emergency: false,
            emergency_number: None,
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create an assistant message from a service response
    ///
    /// The emergency number is kept only when the response is flagged as an
    /// emergency. An omitted number stays `None`; the emergency watcher
    /// resolves it against the selected region.
    pub fn assistant(response: ChatResponse) -> Self {
        let emergency_number = if response.is_emergency {
            response
                .emergency_number
                .filter(|number| !number.trim().is_empty())
        } else {
            None
        };

        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            content: response.answer,
            is_emergency: response.is_emergency,
            emergency_number,
            citations: response.citations,
            created_at: Utc::now(),
        }
    }

    /// Unique message ID
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Who sent this message
    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Message text, unmodified
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the service flagged this answer as an emergency
    #[must_use]
    pub fn is_emergency(&self) -> bool {
        self.is_emergency
    }

    /// Emergency number supplied with an emergency answer
    #[must_use]
    pub fn emergency_number(&self) -> Option<&str> {
        self.emergency_number.as_deref()
    }

    /// Supporting sources in service order
    #[must_use]
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// When the message was appended
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered, append-only message log
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
    /// Bumped by every clear; used to fence late responses
    generation: u64,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its ID
    pub fn append(&mut self, message: ConversationMessage) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Replace the log with an empty one
    pub fn clear(&mut self) {
        self.messages = Vec::new();
        self.generation += 1;
    }

    /// All messages in append order
    #[must_use]
    pub fn all(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get message by ID
    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&ConversationMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Number of clears so far
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Session metadata
#[derive(Clone, Debug, Serialize)]
pub struct SessionMetadata {
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session last saw activity
    pub last_active_at: DateTime<Utc>,
    /// Submissions accepted
    pub exchanges_started: u32,
    /// Exchanges that produced an answer
    pub exchanges_answered: u32,
    /// Exchanges that ended in a transport error
    pub exchanges_failed: u32,
}

impl SessionMetadata {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_active_at: now,
            exchanges_started: 0,
            exchanges_answered: 0,
            exchanges_failed: 0,
        }
    }

    /// Update last active timestamp
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

/// A conversation session
#[derive(Clone, Debug)]
pub struct Session {
    /// Session ID, stable for the life of the view
    id: SessionId,
    /// Region used for the next request
    region: Region,
    /// The message log
    conversation: Conversation,
    /// Activity counters
    metadata: SessionMetadata,
}

impl Session {
    /// Create a new session with a fresh identifier
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self::with_id(SessionId::generate(), region)
    }

    /// Create a session with a specific ID
    #[must_use]
    pub fn with_id(id: SessionId, region: Region) -> Self {
        Self {
            id,
            region,
            conversation: Conversation::new(),
            metadata: SessionMetadata::new(),
        }
    }

    /// Session ID
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Selected region
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Change the region for future requests
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        self.metadata.touch();
    }

    /// The message log
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Mutable access for the owning conductor
    pub(crate) fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Activity counters
    #[must_use]
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut SessionMetadata {
        &mut self.metadata
    }
}
