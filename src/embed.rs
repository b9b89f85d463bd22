//! Embedded signing controller.
//!
//! [`EmbedController`] injects the signing frame into a host page and relays
//! the frame's `postMessage` traffic as typed events:
//!
//! ```text
//!  host window ──message──► origin check ─► source check ─► eventType check
//!                                                               │
//!                                        emit(kind) + emit(any) ◄┘
//! ```
//!
//! Only one frame may be mounted at a time among the controllers that share a
//! [`MountRegistry`].

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::emitter::{EventEmitter, ListenerId};
use crate::error::{ApiKeyError, EmbedError, MountError};
use crate::event::{EmbedEvent, EventKind};
use crate::frame_url::{build_frame_url, extract_origin, FrameAttributes};
use crate::guard::{MountRegistry, OwnerId};
use crate::host::{Host, MessageHandler, SubscriptionId};
use crate::key::PublicApiKey;
use crate::message::{MessageEvent, MessageFilter, Rejection};
use crate::options::{MountArgs, MountOptions, DEFAULT_CONTAINER};

struct Mounted<E> {
    container: E,
    frame: E,
    origin: String,
    debug: bool,
    subscription: SubscriptionId,
}

struct Shared<H: Host> {
    key: PublicApiKey,
    host: Rc<H>,
    registry: Rc<MountRegistry>,
    owner: OwnerId,
    events: EventEmitter<EventKind, EmbedEvent>,
    mounted: RefCell<Option<Mounted<H::Element>>>,
}

pub struct EmbedController<H: Host + 'static> {
    shared: Rc<Shared<H>>,
}

impl<H: Host + 'static> EmbedController<H> {
    /// Creates a controller using this thread's shared mount registry.
    pub fn new(public_api_key: &str, host: Rc<H>) -> Result<Self, ApiKeyError> {
        Self::with_registry(public_api_key, host, MountRegistry::shared())
    }

    pub fn with_registry(
        public_api_key: &str,
        host: Rc<H>,
        registry: Rc<MountRegistry>,
    ) -> Result<Self, ApiKeyError> {
        let key = PublicApiKey::parse(public_api_key)?;
        Ok(Self {
            shared: Rc::new(Shared {
                key,
                host,
                registry,
                owner: OwnerId::next(),
                events: EventEmitter::new(),
                mounted: RefCell::new(None),
            }),
        })
    }

    /// Mounts the signing frame into the single element matching `container`
    /// (the document body when `None`).
    ///
    /// Fails without touching the page when a frame is already mounted, when
    /// the selector does not match exactly one element, or when the signing
    /// URL cannot be parsed.
    pub fn mount(
        &self,
        signing_url: &str,
        container: Option<&str>,
        options: MountOptions,
    ) -> Result<(), MountError> {
        let shared = &self.shared;
        shared.registry.ensure_available()?;

        let selector = container.unwrap_or(DEFAULT_CONTAINER);
        let container = self.resolve_container(selector)?;
        let origin = extract_origin(signing_url)?;

        let src = build_frame_url(signing_url, &shared.key, &options);
        let attrs = FrameAttributes::for_url(src)?;
        let frame = shared.host.create_frame(&attrs)?;

        if options.replaces_container() {
            shared.host.remove_children(&container);
        }
        shared.host.append_child(&container, &frame);
        let subscription = shared.host.add_message_listener(self.message_handler());

        if let Err(err) = shared.registry.acquire(shared.owner) {
            shared.host.remove_message_listener(subscription);
            shared.host.remove(&frame);
            return Err(err.into());
        }

        let debug_enabled = options.debug_enabled();
        debug!(
            target: "embed",
            %origin,
            container = selector,
            debug = debug_enabled,
            "mounted signing frame"
        );
        *shared.mounted.borrow_mut() = Some(Mounted {
            container,
            frame,
            origin,
            debug: debug_enabled,
            subscription,
        });
        Ok(())
    }

    /// `mount` with loosely-typed arguments: `second` may be a selector
    /// string or an options object, in which case the container defaults to
    /// the document body.
    pub fn mount_json(
        &self,
        signing_url: &str,
        second: Option<&Value>,
        third: Option<&Value>,
    ) -> Result<(), MountError> {
        self.shared.registry.ensure_available()?;
        let MountArgs { container, options } = MountArgs::resolve(second, third)?;
        self.mount(signing_url, Some(&container), options)
    }

    /// Removes the frame and stops listening for messages. No-op when this
    /// controller has nothing mounted.
    pub fn unmount(&self) {
        let shared = &self.shared;
        let mounted = shared.mounted.borrow_mut().take();

        if let Some(mounted) = mounted {
            shared.host.remove(&mounted.frame);
            shared.host.remove_message_listener(mounted.subscription);
            debug!(target: "embed", origin = %mounted.origin, "unmounted signing frame");
        }

        // Only releases a mount this controller holds.
        shared.registry.release(shared.owner);
    }

    /// Filters one inbound message and, if it came from the mounted frame,
    /// emits it. Host integrations normally deliver messages through the
    /// subscription made by `mount`.
    pub fn receive_message(&self, event: &MessageEvent) {
        self.shared.receive_message(event);
    }

    fn resolve_container(&self, selector: &str) -> Result<H::Element, MountError> {
        let mut matches = self.shared.host.query_selector_all(selector)?;
        match matches.len() {
            0 => Err(EmbedError::ContainerNotFound(selector.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(EmbedError::ContainerAmbiguous(selector.to_string()).into()),
        }
    }

    fn message_handler(&self) -> MessageHandler {
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move |event: &MessageEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.receive_message(event);
            }
        })
    }

    pub fn on(&self, kind: EventKind, callback: impl Fn(&EmbedEvent) + 'static) -> ListenerId {
        self.shared.events.on(kind, callback)
    }

    pub fn once(&self, kind: EventKind, callback: impl Fn(&EmbedEvent) + 'static) -> ListenerId {
        self.shared.events.once(kind, callback)
    }

    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.shared.events.off(&kind, id)
    }

    pub fn remove_all_listeners(&self, kind: Option<EventKind>) {
        self.shared.events.remove_all(kind.as_ref());
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.shared.events.listener_count(&kind)
    }

    pub fn emit(&self, kind: EventKind, event: &EmbedEvent) -> bool {
        self.shared.events.emit(&kind, event)
    }

    /// The mounted frame element, if any.
    pub fn frame(&self) -> Option<H::Element> {
        self.shared
            .mounted
            .borrow()
            .as_ref()
            .map(|mounted| mounted.frame.clone())
    }

    pub fn container(&self) -> Option<H::Element> {
        self.shared
            .mounted
            .borrow()
            .as_ref()
            .map(|mounted| mounted.container.clone())
    }

    /// Origin messages must come from while mounted.
    pub fn origin(&self) -> Option<String> {
        self.shared
            .mounted
            .borrow()
            .as_ref()
            .map(|mounted| mounted.origin.clone())
    }

    pub fn debug_mode(&self) -> bool {
        self.shared
            .mounted
            .borrow()
            .as_ref()
            .is_some_and(|mounted| mounted.debug)
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.borrow().is_some()
    }

    pub fn public_api_key(&self) -> &PublicApiKey {
        &self.shared.key
    }

    pub fn registry(&self) -> &Rc<MountRegistry> {
        &self.shared.registry
    }

    pub fn host(&self) -> &Rc<H> {
        &self.shared.host
    }
}

impl<H: Host> Shared<H> {
    fn receive_message(&self, event: &MessageEvent) {
        let (filter, verbose) = {
            let mounted = self.mounted.borrow();
            let Some(mounted) = mounted.as_ref() else {
                return;
            };
            let filter = MessageFilter {
                origin: mounted.origin.clone(),
                frame_window: self.host.content_window(&mounted.frame),
            };
            (filter, mounted.debug)
        };

        let kind = match filter.check(event) {
            Ok(kind) => kind,
            Err(rejection) => {
                if verbose {
                    log_rejection(&rejection, &event.data);
                }
                return;
            }
        };

        let payload = EmbedEvent {
            kind,
            data: event.data.clone(),
        };
        self.events.emit(&kind, &payload);
        self.events.emit(&EventKind::Any, &payload);
    }
}

fn log_rejection(rejection: &Rejection, data: &Value) {
    match rejection {
        Rejection::OriginMismatch => {}
        Rejection::ForeignSource => {
            debug!(target: "embed", %data, "message has the frame origin but another source; dropping");
        }
        Rejection::MissingEventType => {
            debug!(target: "embed", "message has no eventType; dropping");
        }
        Rejection::UnknownEventType(event_type) => {
            debug!(target: "embed", event_type = %event_type, "message has unknown eventType; dropping");
        }
    }
}

impl<H: Host + 'static> Drop for EmbedController<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
