//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces report what the
//! user did; the Conductor decides what it means. Typed input and quick
//! actions both arrive here and share one submission path.

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// User submitted text from the input field
    Submit {
        /// Raw input, trimmed by the Conductor
        text: String,
    },

    /// User picked a quick action
    QuickAction {
        /// Position in [`crate::quick_actions::QUICK_ACTIONS`]
        index: usize,
    },

    /// User selected a different region
    RegionChanged {
        /// The new region
        region: Region,
    },

    /// User cleared the conversation
    ClearConversation,
}

impl SurfaceEvent {
    /// Convenience constructor for typed input
    pub fn submit(text: impl Into<String>) -> Self {
        Self::Submit { text: text.into() }
    }
}
