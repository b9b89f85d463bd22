//! Mount options.
//!
//! Only a fixed allow-list of keys is ever forwarded into the frame URL.
//! Options keep the order in which they were supplied, because that order is
//! the order of the query parameters.

use serde_json::{Map, Number, Value};

use crate::error::MountError;

/// Option keys accepted by `mount`, in their wire spelling.
pub const ALLOWED_MOUNT_OPTIONS: [&str; 4] = ["debug", "isTest", "locale", "redirectURL"];

/// Host-side option: clear the container before appending the frame.
/// Never forwarded to the frame.
pub const REPLACE_OPTION: &str = "replace";

pub const DEFAULT_CONTAINER: &str = "body";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountOption {
    Debug,
    IsTest,
    Locale,
    RedirectUrl,
}

impl MountOption {
    pub fn as_param(self) -> &'static str {
        match self {
            MountOption::Debug => "debug",
            MountOption::IsTest => "isTest",
            MountOption::Locale => "locale",
            MountOption::RedirectUrl => "redirectURL",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "debug" => Some(MountOption::Debug),
            "isTest" => Some(MountOption::IsTest),
            "locale" => Some(MountOption::Locale),
            "redirectURL" => Some(MountOption::RedirectUrl),
            _ => None,
        }
    }
}

/// A scalar option value. The value is rendered into the query string the
/// way it was supplied, so `debug: 1` stays `debug=1`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    Flag(bool),
    Number(Number),
    Text(String),
}

impl OptionValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(OptionValue::Null),
            Value::Bool(b) => Some(OptionValue::Flag(*b)),
            Value::Number(n) => Some(OptionValue::Number(n.clone())),
            Value::String(s) => Some(OptionValue::Text(s.clone())),
            // Bracketed `key[0]=` / `key[sub]=` expansion is not supported;
            // nested values never reach the frame URL.
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Null => false,
            OptionValue::Flag(b) => *b,
            OptionValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            OptionValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            OptionValue::Null => String::new(),
            OptionValue::Flag(b) => b.to_string(),
            OptionValue::Number(n) => n.to_string(),
            OptionValue::Text(s) => s.clone(),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountOptions {
    entries: Vec<(MountOption, OptionValue)>,
    replace: bool,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the allow-listed keys out of a JSON object, keeping their order.
    /// Unknown keys and nested values are dropped. Non-object values yield
    /// empty options.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let mut options = Self::default();
        for (key, value) in map {
            if key == REPLACE_OPTION {
                options.replace = OptionValue::from_json(value).is_some_and(|v| v.is_truthy());
                continue;
            }
            let Some(option) = MountOption::from_param(key) else {
                continue;
            };
            if let Some(value) = OptionValue::from_json(value) {
                options.set(option, value);
            }
        }
        options
    }

    /// Sets an option. Re-setting an option keeps its original position.
    pub fn set(&mut self, option: MountOption, value: impl Into<OptionValue>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == option) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((option, value)),
        }
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.set(MountOption::Debug, enabled);
        self
    }

    pub fn is_test(mut self, enabled: bool) -> Self {
        self.set(MountOption::IsTest, enabled);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.set(MountOption::Locale, locale.into());
        self
    }

    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.set(MountOption::RedirectUrl, url.into());
        self
    }

    pub fn replace(mut self, enabled: bool) -> Self {
        self.replace = enabled;
        self
    }

    pub fn get(&self, option: MountOption) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == option)
            .map(|(_, value)| value)
    }

    pub fn debug_enabled(&self) -> bool {
        self.get(MountOption::Debug).is_some_and(OptionValue::is_truthy)
    }

    pub fn replaces_container(&self) -> bool {
        self.replace
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Query parameters for the frame URL, in insertion order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.entries
            .iter()
            .map(|(option, value)| (option.as_param(), value.render()))
    }
}

/// Arguments to `mount` after resolving the optional-container call shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MountArgs {
    pub container: String,
    pub options: MountOptions,
}

impl MountArgs {
    /// Resolves loosely-typed `(container, options)` arguments.
    ///
    /// When `second` is an object it is taken as the options and the
    /// container defaults to the document body; `third` is then ignored.
    pub fn resolve(second: Option<&Value>, third: Option<&Value>) -> Result<Self, MountError> {
        let options_from = |value: Option<&Value>| value.map(MountOptions::from_json).unwrap_or_default();

        match second {
            None | Some(Value::Null) => Ok(Self {
                container: DEFAULT_CONTAINER.to_string(),
                options: options_from(third),
            }),
            Some(Value::Object(map)) => Ok(Self {
                container: DEFAULT_CONTAINER.to_string(),
                options: MountOptions::from_map(map),
            }),
            Some(Value::String(selector)) => Ok(Self {
                container: selector.clone(),
                options: options_from(third),
            }),
            Some(other) => Err(MountError::InvalidArgument(format!(
                "container must be a selector string or an options object, got {other}"
            ))),
        }
    }
}
