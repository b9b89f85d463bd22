//! Embeds a hosted signing interface into a page through an iframe and
//! relays the frame's messages as typed events.

pub mod config;
pub mod dom;
pub mod embed;
pub mod emitter;
pub mod error;
pub mod event;
pub mod frame_url;
pub mod guard;
pub mod host;
pub mod key;
pub mod message;
pub mod options;

// Re-export commonly used types
pub use config::EmbedSettings;
pub use dom::HtmlHost;
pub use embed::EmbedController;
pub use emitter::{EventEmitter, ListenerId};
pub use error::{ApiKeyError, EmbedError, MountError};
pub use event::{EmbedEvent, EventKind};
pub use frame_url::{FrameAttributes, IFRAME_CLASSNAME, PUBLIC_API_KEY_PARAM};
pub use guard::MountRegistry;
pub use host::{Host, HostError, WindowId};
pub use key::{PublicApiKey, MIN_PUBLIC_API_KEY_LENGTH, PUBLIC_API_KEY_PREFIX};
pub use message::MessageEvent;
pub use options::{MountOptions, ALLOWED_MOUNT_OPTIONS};
