use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::options::{MountArgs, MountOptions, DEFAULT_CONTAINER};

pub const CONFIG_ENV_VAR: &str = "BLUEINK_EMBED_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read embed config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no config path given and BLUEINK_EMBED_CONFIG is not set")]
    MissingPath,
}

/// Everything needed to mount one embedded signing session.
///
/// ```yaml
/// public_api_key: public_...
/// signing_url: https://secure.blueink.com/embed/...
/// container: "#signing"
/// options:
///   locale: en
///   debug: true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedSettings {
    pub public_api_key: String,
    pub signing_url: String,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub options: Option<Value>,
}

impl EmbedSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .ok_or(SettingsError::MissingPath)?;
        Self::load(path)
    }

    /// Container and options after the same allow-list `mount_json` applies.
    pub fn mount_args(&self) -> MountArgs {
        MountArgs {
            container: self
                .container
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            options: self
                .options
                .as_ref()
                .map(MountOptions::from_json)
                .unwrap_or_default(),
        }
    }
}
