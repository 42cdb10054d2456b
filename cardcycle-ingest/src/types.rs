use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// How much of the platform inbox the app may read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboxAccess {
    /// Messages can be listed without user involvement
    FullRead,
    /// Only messages the user hands over (paste/share) are visible
    PromptOnly,
    Unavailable,
}

/// One text message as delivered by an inbox source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub sender: String,
    pub body: String,
    /// Local receive time, if the source records one
    #[serde(default)]
    pub received_at: Option<NaiveDateTime>,
}

impl RawMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            received_at: None,
        }
    }

    pub fn received_at(mut self, at: NaiveDateTime) -> Self {
        self.received_at = Some(at);
        self
    }
}
