//! Host page primitives the embed relies on.
//!
//! The embed never touches a concrete DOM. Whatever owns the page (a browser
//! binding, a headless document, a test double) implements [`Host`].

use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use uuid::Uuid;

use crate::frame_url::FrameAttributes;
use crate::message::MessageEvent;

/// Identity of a browsing context, compared against a message's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub type MessageHandler = Rc<dyn Fn(&MessageEvent)>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("'{0}' is not a valid selector")]
    InvalidSelector(String),
    #[error("failed to create <{0}> element")]
    CreateElement(&'static str),
}

pub trait Host {
    type Element: Clone;

    /// All elements matching a CSS selector, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, HostError>;

    /// Creates a detached frame element carrying `attrs`.
    fn create_frame(&self, attrs: &FrameAttributes) -> Result<Self::Element, HostError>;

    /// Window of a frame element, if it currently has one.
    fn content_window(&self, frame: &Self::Element) -> Option<WindowId>;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    fn remove_children(&self, parent: &Self::Element);

    /// Detaches `element` from its parent.
    fn remove(&self, element: &Self::Element);

    /// Subscribes to the window-wide `message` channel.
    fn add_message_listener(&self, handler: MessageHandler) -> SubscriptionId;

    fn remove_message_listener(&self, id: SubscriptionId);
}
