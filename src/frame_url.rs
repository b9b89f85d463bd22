use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::key::PublicApiKey;
use crate::options::MountOptions;

pub const PUBLIC_API_KEY_PARAM: &str = "publicAPIKey";
pub const IFRAME_CLASSNAME: &str = "blueink-sig-iframe";

// RFC 3986 unreserved characters pass through untouched.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Serialized origin (scheme, host and port) of `url`, used to authenticate
/// inbound messages. Default ports are omitted.
pub fn extract_origin(url: &str) -> Result<String, url::ParseError> {
    let parsed = Url::parse(url)?;
    Ok(parsed.origin().ascii_serialization())
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT).to_string()
}

/// Frame `src`: the signing URL as given, followed by the API key and the
/// supplied options as query parameters.
pub fn build_frame_url(signing_url: &str, key: &PublicApiKey, options: &MountOptions) -> String {
    let mut query = format!("{}={}", encode(PUBLIC_API_KEY_PARAM), encode(key.as_str()));
    for (name, value) in options.query_pairs() {
        query.push('&');
        query.push_str(&encode(name));
        query.push('=');
        query.push_str(&encode(&value));
    }
    format!("{signing_url}?{query}")
}

/// Permissions policy granting camera and geolocation to `origin` only.
pub fn permissions_policy(origin: &str) -> String {
    format!("camera {origin}; geolocation {origin}")
}

/// Attributes of the frame element the host is asked to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAttributes {
    pub class_name: String,
    pub src: String,
    pub allow: String,
}

impl FrameAttributes {
    pub fn for_url(src: impl Into<String>) -> Result<Self, url::ParseError> {
        let src = src.into();
        let origin = extract_origin(&src)?;
        Ok(Self {
            class_name: IFRAME_CLASSNAME.to_string(),
            allow: permissions_policy(&origin),
            src,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMBED_URL: &str =
        "https://secure.blueink.com/embed/abcd1234/abcd1234yVhL3bALas9UJSLINMc9F1zeBJw";

    fn key() -> PublicApiKey {
        PublicApiKey::parse(&format!("public_{}", "k".repeat(64))).unwrap()
    }

    #[test]
    fn origin_drops_path_and_default_port() {
        assert_eq!(
            extract_origin("https://secure.example.com/embed/x").unwrap(),
            "https://secure.example.com"
        );
        assert_eq!(
            extract_origin("https://secure.example.com:443/embed").unwrap(),
            "https://secure.example.com"
        );
        assert_eq!(
            extract_origin("http://localhost:8000/embed").unwrap(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn malformed_url_is_an_error() {
        assert!(extract_origin("/relative/path").is_err());
        assert!(extract_origin("").is_err());
    }

    #[test]
    fn key_only_url() {
        let key = key();
        let expected = format!("{EMBED_URL}?publicAPIKey={}", key.as_str());
        assert_eq!(build_frame_url(EMBED_URL, &key, &MountOptions::new()), expected);
    }

    #[test]
    fn redirect_url_is_encoded() {
        let key = key();
        let options = MountOptions::new().redirect_url("https://example.com");
        assert_eq!(
            build_frame_url(EMBED_URL, &key, &options),
            format!(
                "{EMBED_URL}?publicAPIKey={}&redirectURL=https%3A%2F%2Fexample.com",
                key.as_str()
            )
        );
    }

    #[test]
    fn all_options_in_given_order() {
        let key = key();
        let options = MountOptions::from_json(&serde_json::json!({
            "redirectURL": "https://example.com",
            "debug": 1,
            "isTest": true,
            "locale": "en",
        }));
        assert_eq!(
            build_frame_url(EMBED_URL, &key, &options),
            format!(
                "{EMBED_URL}?publicAPIKey={}&redirectURL=https%3A%2F%2Fexample.com&debug=1&isTest=true&locale=en",
                key.as_str()
            )
        );
    }

    #[test]
    fn spaces_and_unicode_are_percent_encoded() {
        assert_eq!(encode("a b~c*"), "a%20b~c%2A");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn frame_attributes() {
        let attrs = FrameAttributes::for_url("https://example.com/").unwrap();
        assert_eq!(attrs.class_name, IFRAME_CLASSNAME);
        assert_eq!(attrs.src, "https://example.com/");
        assert_eq!(
            attrs.allow,
            "camera https://example.com; geolocation https://example.com"
        );
    }
}
