use serde::{Deserialize, Serialize};

use crate::deck::SlideSummary;

/// Message exchanged between the main display and the presenter surface.
///
/// Serialized as JSON with a `type` discriminator, e.g.
/// `{"type":"nav","index":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyncPayload {
    State {
        slides: Vec<SlideSummary>,
        index: usize,
    },
    Update {
        slides: Vec<SlideSummary>,
        index: usize,
    },
    Nav {
        index: usize,
    },
    Control {
        action: ControlAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Next,
    Prev,
    Close,
}

impl SyncPayload {
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a message. Unknown types and malformed fields yield `None`.
    pub fn from_message(message: &str) -> Option<Self> {
        serde_json::from_str(message).ok()
    }

    /// Slides and index carried by `state`/`update` payloads.
    pub fn snapshot(&self) -> Option<(&[SlideSummary], usize)> {
        match self {
            Self::State { slides, index } | Self::Update { slides, index } => {
                Some((slides.as_slice(), *index))
            }
            Self::Nav { .. } | Self::Control { .. } => None,
        }
    }
}
