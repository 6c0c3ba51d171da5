//! Quick Actions
//!
//! Pre-authored situation descriptions. Choosing one is the same as typing
//! its text and pressing submit.

/// A shortcut offered next to the input field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuickAction {
    /// Decorative icon
    pub icon: &'static str,
    /// Text submitted verbatim
    pub text: &'static str,
}

/// Shortcuts in display order
pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction {
        icon: "🩸",
        text: "Severe bleeding that won't stop",
    },
    QuickAction {
        icon: "💨",
        text: "Someone is choking",
    },
    QuickAction {
        icon: "🔥",
        text: "How to treat a burn",
    },
    QuickAction {
        icon: "💊",
        text: "Possible poisoning",
    },
    QuickAction {
        icon: "🦴",
        text: "Suspected broken bone",
    },
    QuickAction {
        icon: "🫀",
        text: "How to do CPR",
    },
];

/// Look up a shortcut by its position
#[must_use]
pub fn quick_action(index: usize) -> Option<&'static QuickAction> {
    QUICK_ACTIONS.get(index)
}
