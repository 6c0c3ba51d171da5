//! Emergency Watcher
//!
//! Derives the emergency banner from the conversation. Pure: recomputed from
//! the message log whenever it is read, never stored.
//!
//! The banner reflects the most recent assistant message flagged as an
//! emergency, regardless of what followed it.

use serde::Serialize;

use crate::messages::{MessageId, MessageRole};
use crate::region::Region;
use crate::session::ConversationMessage;

/// Banner state for surfaces
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmergencyBanner {
    /// The assistant message driving the banner
    pub message_id: MessageId,
    /// Number to display
    pub emergency_number: String,
}

/// Find the active emergency banner, if any
///
/// When the driving message carries no number, the number of `region` (the
/// currently selected region) is shown instead.
#[must_use]
pub fn active_banner(messages: &[ConversationMessage], region: Region) -> Option<EmergencyBanner> {
    messages
        .iter()
        .rev()
        .find(|m| m.role() == MessageRole::Assistant && m.is_emergency())
        .map(|m| EmergencyBanner {
            message_id: m.id(),
            emergency_number: m
                .emergency_number()
                .unwrap_or_else(|| region.emergency_number())
                .to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ChatResponse;

    fn assistant(answer: &str) -> ConversationMessage {
        ConversationMessage::assistant(ChatResponse::answer(answer))
    }

    fn emergency(answer: &str, number: Option<&str>) -> ConversationMessage {
        ConversationMessage::assistant(ChatResponse::answer(answer).with_emergency(number))
    }

    #[test]
    fn test_empty_conversation_has_no_banner() {
        assert!(active_banner(&[], Region::Uk).is_none());
    }

    #[test]
    fn test_no_flagged_messages_has_no_banner() {
        let messages = vec![
            ConversationMessage::user("cut"),
            assistant("Apply pressure"),
            ConversationMessage::user("bruise"),
            assistant("Ice it"),
        ];
        assert!(active_banner(&messages, Region::Uk).is_none());
    }

    #[test]
    fn test_most_recent_emergency_wins() {
        let older = emergency("Call now", Some("999"));
        let newer = emergency("Call again", Some("112"));
        let newer_id = newer.id();
        let messages = vec![older, assistant("calm"), newer];

        let banner = active_banner(&messages, Region::Uk).unwrap();
        assert_eq!(banner.message_id, newer_id);
        assert_eq!(banner.emergency_number, "112");
    }

    #[test]
    fn test_later_non_emergency_does_not_clear_banner() {
        let messages = vec![emergency("Call now", Some("999")), assistant("Keep warm")];
        let banner = active_banner(&messages, Region::Uk).unwrap();
        assert_eq!(banner.emergency_number, "999");
    }

    #[test]
    fn test_missing_number_falls_back_to_selected_region() {
        let messages = vec![emergency("Call now", None)];
        assert_eq!(
            active_banner(&messages, Region::Us).unwrap().emergency_number,
            "911"
        );
        assert_eq!(
            active_banner(&messages, Region::Uk).unwrap().emergency_number,
            "999"
        );
    }
}
