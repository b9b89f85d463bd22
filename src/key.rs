use std::fmt;
use std::str::FromStr;

use crate::error::ApiKeyError;

/// Measured in UTF-16 code units, the way browsers measure string length.
pub const MIN_PUBLIC_API_KEY_LENGTH: usize = 71;
pub const PUBLIC_API_KEY_PREFIX: &str = "public_";

/// A public API key that has passed the shape checks.
///
/// Only the shape is validated here; the key is verified server-side when the
/// frame loads.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicApiKey(String);

impl PublicApiKey {
    pub fn parse(raw: &str) -> Result<Self, ApiKeyError> {
        if raw.is_empty() {
            return Err(ApiKeyError::Missing);
        }

        let len = raw.encode_utf16().count();
        if len < MIN_PUBLIC_API_KEY_LENGTH {
            return Err(ApiKeyError::TooShort { len });
        }

        if !raw.starts_with(PUBLIC_API_KEY_PREFIX) {
            return Err(ApiKeyError::Invalid);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PublicApiKey {
    type Err = ApiKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PublicApiKey {
    type Error = ApiKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for PublicApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Keys end up in logs through Debug; keep only the prefix visible.
impl fmt::Debug for PublicApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(PUBLIC_API_KEY_PREFIX.len() + 4).collect();
        write!(f, "PublicApiKey({visible}…)")
    }
}
