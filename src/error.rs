use thiserror::Error;

use crate::host::HostError;

/// Raised when constructing an embed with a malformed public API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiKeyError {
    #[error("public API key must be provided")]
    Missing,
    #[error(
        "public API key is too short ({len} characters). Please verify you are using a valid BlueInk public API key"
    )]
    TooShort { len: usize },
    #[error("public API key is invalid. Please verify you are using a valid BlueInk public API key")]
    Invalid,
}

/// Lifecycle violations raised by `mount`.
///
/// A failed mount leaves any previously mounted frame untouched, so the
/// call can be retried once the condition is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    #[error("cannot mount multiple iframes at once")]
    AlreadyMounted,
    #[error("cannot find element matching container selector \"{0}\"")]
    ContainerNotFound(String),
    #[error("more than one element found matching container selector \"{0}\"")]
    ContainerAmbiguous(String),
}

impl EmbedError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EmbedError::AlreadyMounted => "embed_already_mounted",
            EmbedError::ContainerNotFound(_) => "embed_container_not_found",
            EmbedError::ContainerAmbiguous(_) => "embed_container_ambiguous",
        }
    }
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    Embed(#[from] EmbedError),
    #[error("failed to parse signing URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("host error: {0}")]
    Host(#[from] HostError),
    #[error("invalid mount argument: {0}")]
    InvalidArgument(String),
}

impl MountError {
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, MountError::Embed(_))
    }

    pub fn as_embed_error(&self) -> Option<&EmbedError> {
        match self {
            MountError::Embed(err) => Some(err),
            _ => None,
        }
    }
}
