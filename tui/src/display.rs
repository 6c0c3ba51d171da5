//! Display State Types
//!
//! Types that represent what the TUI shows. A [`DisplayState`] is a snapshot
//! taken from the Conductor right before each frame; rendering reads only
//! the snapshot, never the Conductor.
//!
//! - DisplayMessage: a conversation message ready for rendering
//! - DisplayState: everything one frame needs
//!
//! The text helpers here are pure so their wording can be tested without a
//! terminal.

use buddy_conductor::{
    Citation, ConductorState, ConversationMessage, EmergencyBanner, MessageId, MessageRole,
    Region,
};

/// Assistant display name
pub const BUDDY_NAME: &str = "First-Aid Buddy";

/// Advisory line under the emergency headline
pub const EMERGENCY_ADVISORY: &str =
    "This may be life-threatening. Follow the steps below while waiting for emergency services.";

/// A rendered conversation message
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content, unmodified
    pub content: String,
    /// Supporting sources (assistant only)
    pub citations: Vec<Citation>,
    /// Whether the answer was flagged as an emergency
    pub is_emergency: bool,
}

impl From<&ConversationMessage> for DisplayMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            id: message.id(),
            role: message.role().into(),
            content: message.content().to_string(),
            citations: message.citations().to_vec(),
            is_emergency: message.is_emergency(),
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// First-Aid Buddy
    Assistant,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => DisplayRole::User,
            MessageRole::Assistant => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "First-Aid Buddy: ",
        }
    }
}

/// Result of the start-up health probe
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ServiceHealth {
    /// Not checked yet
    #[default]
    Unknown,
    /// `/health` answered with success
    Online,
    /// `/health` failed or was unreachable
    Offline,
}

impl ServiceHealth {
    /// Status bar label
    pub fn label(&self) -> &'static str {
        match self {
            ServiceHealth::Unknown => "service: checking",
            ServiceHealth::Online => "service: online",
            ServiceHealth::Offline => "service: offline",
        }
    }
}

/// The full display state for one frame
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    /// Conversation messages in display order
    pub messages: Vec<DisplayMessage>,
    /// Active emergency banner
    pub banner: Option<EmergencyBanner>,
    /// Most recent transport failure
    pub last_error: Option<String>,
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Selected region
    pub region: Region,
    /// Start-up health probe result
    pub health: ServiceHealth,
    /// Current input buffer
    pub input: String,
    /// Whether citation lists are expanded
    pub show_sources: bool,
    /// Lines scrolled up from the bottom (0 = latest)
    pub scroll_offset: usize,
}

impl DisplayState {
    /// Whether the input box accepts submissions
    pub fn input_enabled(&self) -> bool {
        self.conductor_state.accepts_input()
    }
}

/// Collapsed citation toggle text, `None` when there are no sources
pub fn citation_summary(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 source used".to_string()),
        n => Some(format!("{n} sources used")),
    }
}

/// Numbered source list shown when citations are expanded
pub fn citation_lines(citations: &[Citation]) -> Vec<String> {
    let mut lines = vec!["Knowledge sources".to_string()];
    for (i, citation) in citations.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, citation.title));
        if !citation.snippet.trim().is_empty() {
            lines.push(format!("   {}", citation.snippet.trim()));
        }
    }
    lines
}

/// Banner headline for an emergency number
pub fn banner_headline(emergency_number: &str) -> String {
    format!("⚠ EMERGENCY DETECTED: Call {emergency_number} immediately")
}

/// Status bar text
pub fn status_text(state: &DisplayState) -> String {
    let scroll_info = if state.scroll_offset > 0 {
        format!(" | ^{} lines", state.scroll_offset)
    } else {
        String::new()
    };
    format!(
        " {} | Region {} | {} | Tab region  F1-F6 quick  F8 sources  Ctrl+L clear  Esc quit{}",
        state.conductor_state.description(),
        state.region.label(),
        state.health.label(),
        scroll_info
    )
}
