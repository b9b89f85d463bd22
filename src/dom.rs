//! In-memory host document backed by kuchiki.
//!
//! `HtmlHost` parses an HTML page and implements [`Host`] on top of it:
//! selector lookup, frame creation, tree mutation and a synchronous window
//! message channel. Frames get a window identity while they are connected to
//! the document, which is what message sources are compared against.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kuchiki::traits::*;
use kuchiki::NodeRef;
use serde_json::Value;
use tracing::trace;

use crate::frame_url::FrameAttributes;
use crate::host::{Host, HostError, MessageHandler, SubscriptionId, WindowId};
use crate::message::MessageEvent;

pub struct HtmlHost {
    document: NodeRef,
    window: WindowId,
    frames: RefCell<Vec<(NodeRef, WindowId)>>,
    listeners: RefCell<Vec<(SubscriptionId, MessageHandler)>>,
    next_subscription: Cell<u64>,
}

impl HtmlHost {
    pub fn from_html(html: &str) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
            window: WindowId::new(),
            frames: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    /// Identity of the top-level window owning the document.
    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn to_html(&self) -> String {
        self.document.to_string()
    }

    pub fn message_listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `event` to every message listener, in subscription order.
    pub fn post_message(&self, event: &MessageEvent) {
        let handlers: Vec<MessageHandler> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        trace!(origin = %event.origin, listeners = handlers.len(), "dispatching message");
        for handler in handlers {
            handler(event);
        }
    }

    /// Posts `data` as if sent by `frame`'s window from `origin`.
    pub fn post_message_from(&self, frame: &NodeRef, origin: &str, data: Value) {
        let event = MessageEvent::new(origin, self.content_window(frame), data);
        self.post_message(&event);
    }

    pub fn attribute(element: &NodeRef, name: &str) -> Option<String> {
        let element = element.as_element()?;
        let attributes = element.attributes.borrow();
        attributes.get(name).map(str::to_string)
    }

    pub fn tag_name(element: &NodeRef) -> Option<String> {
        element
            .as_element()
            .map(|element| element.name.local.to_string())
    }

    fn is_connected(&self, node: &NodeRef) -> bool {
        node.ancestors().any(|ancestor| ancestor == self.document)
    }
}

impl Host for HtmlHost {
    type Element = NodeRef;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeRef>, HostError> {
        let matches = self
            .document
            .select(selector)
            .map_err(|()| HostError::InvalidSelector(selector.to_string()))?;
        Ok(matches.map(|element| element.as_node().clone()).collect())
    }

    fn create_frame(&self, attrs: &FrameAttributes) -> Result<NodeRef, HostError> {
        let scratch = kuchiki::parse_html().one("<iframe></iframe>");
        let frame = scratch
            .select_first("iframe")
            .map_err(|()| HostError::CreateElement("iframe"))?;
        {
            let mut attributes = frame.attributes.borrow_mut();
            attributes.insert("class", attrs.class_name.clone());
            attributes.insert("src", attrs.src.clone());
            attributes.insert("allow", attrs.allow.clone());
        }
        let node = frame.as_node().clone();
        node.detach();
        self.frames.borrow_mut().push((node.clone(), WindowId::new()));
        Ok(node)
    }

    fn content_window(&self, frame: &NodeRef) -> Option<WindowId> {
        if !self.is_connected(frame) {
            return None;
        }
        self.frames
            .borrow()
            .iter()
            .find(|(node, _)| node == frame)
            .map(|(_, window)| *window)
    }

    fn append_child(&self, parent: &NodeRef, child: &NodeRef) {
        parent.append(child.clone());
    }

    fn remove_children(&self, parent: &NodeRef) {
        let children: Vec<NodeRef> = parent.children().collect();
        for child in children {
            child.detach();
        }
    }

    fn remove(&self, element: &NodeRef) {
        element.detach();
        // A removed frame's browsing context is discarded.
        self.frames.borrow_mut().retain(|(node, _)| node != element);
    }

    fn add_message_listener(&self, handler: MessageHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, handler));
        id
    }

    fn remove_message_listener(&self, id: SubscriptionId) {
        self.listeners
            .borrow_mut()
            .retain(|(subscription, _)| *subscription != id);
    }
}
