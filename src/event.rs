use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events relayed from the embedded signing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Catch-all: receives every recognized event.
    Any,
    /// Initial frame load finished; documents may not be ready to sign yet.
    Load,
    /// Documents are ready to sign.
    Ready,
    /// Signing is complete.
    Complete,
    /// Signer authentication failed.
    AuthFail,
    /// Signer authentication succeeded, also sent when no authentication was required.
    AuthSuccess,
    /// An error that prevents embedded signing from continuing.
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Any,
        EventKind::Load,
        EventKind::Ready,
        EventKind::Complete,
        EventKind::AuthFail,
        EventKind::AuthSuccess,
        EventKind::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Any => "any",
            EventKind::Load => "load",
            EventKind::Ready => "ready",
            EventKind::Complete => "complete",
            EventKind::AuthFail => "auth_fail",
            EventKind::AuthSuccess => "auth_success",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// What listeners receive: the event type and the raw message payload,
/// including its `eventType` field.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedEvent {
    pub kind: EventKind,
    pub data: Value,
}

impl EmbedEvent {
    /// `message` field of an `error` payload, if present.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}
