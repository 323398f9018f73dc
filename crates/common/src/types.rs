use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

use crate::identity::LocalIdentity;

// ── Messages ────────────────────────────────────────────────────────────────

/// A chat line as the backend stores and returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    #[serde(default)]
    pub time_sent: DateTime<Utc>,
}

impl ChatMessage {
    /// Build an outgoing message stamped with the current time.
    pub fn new(sender: &LocalIdentity, body: impl Into<String>) -> Self {
        Self {
            username: sender.as_str().to_string(),
            message: body.into(),
            time_sent: Utc::now(),
        }
    }
}

// ── Presence ────────────────────────────────────────────────────────────────

/// Snapshot of a user the backend considers active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub username: String,
    #[serde(default)]
    pub last_ping: DateTime<Utc>,
}

/// Liveness announcement posted to `/ping` once per heartbeat tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatSignal {
    pub username: String,
    pub time_sent: DateTime<Utc>,
}

impl HeartbeatSignal {
    pub fn now(sender: &LocalIdentity) -> Self {
        Self {
            username: sender.as_str().to_string(),
            time_sent: Utc::now(),
        }
    }
}
