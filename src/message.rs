use serde_json::Value;

use crate::event::EventKind;
use crate::host::WindowId;

/// A cross-document message as delivered to the host window.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub origin: String,
    pub source: Option<WindowId>,
    pub data: Value,
}

impl MessageEvent {
    pub fn new(origin: impl Into<String>, source: Option<WindowId>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            source,
            data,
        }
    }
}

/// Why a message was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    OriginMismatch,
    ForeignSource,
    MissingEventType,
    UnknownEventType(String),
}

/// Accepts only messages sent by the mounted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    pub origin: String,
    pub frame_window: Option<WindowId>,
}

impl MessageFilter {
    pub fn check(&self, event: &MessageEvent) -> Result<EventKind, Rejection> {
        if event.origin != self.origin {
            return Err(Rejection::OriginMismatch);
        }

        if event.source != self.frame_window {
            return Err(Rejection::ForeignSource);
        }

        let raw = event_type(&event.data).ok_or(Rejection::MissingEventType)?;
        raw.parse::<EventKind>()
            .map_err(|unknown| Rejection::UnknownEventType(unknown.0))
    }
}

// A falsy `eventType` counts as missing. Non-string values are rendered so
// they are reported as unknown rather than missing.
fn event_type(data: &Value) -> Option<String> {
    match data.get("eventType")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ORIGIN: &str = "https://secure.example.com";

    fn filter(window: WindowId) -> MessageFilter {
        MessageFilter {
            origin: ORIGIN.to_string(),
            frame_window: Some(window),
        }
    }

    #[test]
    fn accepts_recognized_event_from_frame() {
        let window = WindowId::new();
        let event = MessageEvent::new(ORIGIN, Some(window), json!({ "eventType": "complete" }));
        assert_eq!(filter(window).check(&event), Ok(EventKind::Complete));
    }

    #[test]
    fn origin_must_match_exactly() {
        let window = WindowId::new();
        for origin in ["https://evil.example.com", "https://secure.example.com:8443", "http://secure.example.com", ""] {
            let event = MessageEvent::new(origin, Some(window), json!({ "eventType": "ready" }));
            assert_eq!(filter(window).check(&event), Err(Rejection::OriginMismatch));
        }
    }

    #[test]
    fn source_must_be_the_frame() {
        let window = WindowId::new();
        let other = MessageEvent::new(ORIGIN, Some(WindowId::new()), json!({ "eventType": "ready" }));
        let none = MessageEvent::new(ORIGIN, None, json!({ "eventType": "ready" }));
        assert_eq!(filter(window).check(&other), Err(Rejection::ForeignSource));
        assert_eq!(filter(window).check(&none), Err(Rejection::ForeignSource));
    }

    #[test]
    fn missing_or_falsy_event_type() {
        let window = WindowId::new();
        for data in [
            json!({}),
            json!("complete"),
            json!(null),
            json!({ "eventType": "" }),
            json!({ "eventType": null }),
            json!({ "eventType": 0 }),
            json!({ "eventType": false }),
        ] {
            let event = MessageEvent::new(ORIGIN, Some(window), data);
            assert_eq!(filter(window).check(&event), Err(Rejection::MissingEventType));
        }
    }

    #[test]
    fn unknown_event_type() {
        let window = WindowId::new();
        let event = MessageEvent::new(ORIGIN, Some(window), json!({ "eventType": "touch" }));
        assert_eq!(
            filter(window).check(&event),
            Err(Rejection::UnknownEventType("touch".into()))
        );
        let numeric = MessageEvent::new(ORIGIN, Some(window), json!({ "eventType": 3 }));
        assert_eq!(
            filter(window).check(&numeric),
            Err(Rejection::UnknownEventType("3".into()))
        );
    }
}
