/// Connection string parsing and hub endpoint addressing
use std::fmt;

use url::{form_urlencoded, Url};

use crate::errors::{NotihubError, Result};

pub const SCHEME_DEFAULT: &str = "https";
pub const API_VERSION_PARAM: &str = "api-version";
pub const API_VERSION_VALUE: &str = "2015-01";

const ENDPOINT_KEY: &str = "endpoint";
const KEY_NAME_KEY: &str = "sharedaccesskeyname";
const KEY_VALUE_KEY: &str = "sharedaccesskey";

/// Shared access key used to sign hub requests
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HubCredentials {
    pub key_name: String,
    pub key_value: String,
}

impl HubCredentials {
    pub fn new(key_name: impl Into<String>, key_value: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            key_value: key_value.into(),
        }
    }
}

impl fmt::Debug for HubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubCredentials")
            .field("key_name", &self.key_name)
            .field("key_value", &"<redacted>")
            .finish()
    }
}

/// Parsed form of
/// `Endpoint=sb://<host>/;SharedAccessKeyName=<name>;SharedAccessKey=<value>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub credentials: HubCredentials,
}

impl ConnectionString {
    /// Parse a connection string. Keys match case-insensitively and unknown
    /// keys are ignored; all three known keys must be present.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut host = None;
        let mut key_name = None;
        let mut key_value = None;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                NotihubError::InvalidConnectionString(format!("malformed segment '{}'", part))
            })?;

            match key.trim().to_ascii_lowercase().as_str() {
                ENDPOINT_KEY => host = Some(endpoint_host(value)?),
                KEY_NAME_KEY => key_name = Some(value.to_string()),
                KEY_VALUE_KEY => key_value = Some(value.to_string()),
                _ => {}
            }
        }

        match (host, key_name, key_value) {
            (Some(host), Some(key_name), Some(key_value)) => Ok(Self {
                host,
                credentials: HubCredentials { key_name, key_value },
            }),
            _ => Err(NotihubError::InvalidConnectionString(
                "expected Endpoint, SharedAccessKeyName and SharedAccessKey".to_string(),
            )),
        }
    }

    /// Parse a connection string, falling back to empty fields when it is
    /// malformed.
    ///
    /// A hub built from the fallback still constructs; its requests carry an
    /// empty host and signing key and are rejected remotely rather than
    /// locally. Callers wanting an early failure should use [`Self::parse`].
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|e| {
            tracing::warn!("Using empty hub credentials: {}", e);
            Self::default()
        })
    }
}

fn endpoint_host(value: &str) -> Result<String> {
    let without_scheme = value
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(value);
    let host = without_scheme.split('/').next().unwrap_or_default();

    if host.is_empty() {
        return Err(NotihubError::InvalidConnectionString(format!(
            "endpoint '{}' has no host",
            value
        )));
    }

    Ok(host.to_string())
}

/// Base address of one hub: `https://<host>/<hub path>?api-version=...`.
///
/// Kept as parts rather than a parsed [`Url`] so that a hub with an empty host
/// (see [`ConnectionString::parse_lenient`]) can still be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEndpoint {
    scheme: String,
    host: String,
    path: String,
    query: String,
}

impl HubEndpoint {
    pub fn new(host: impl Into<String>, hub_path: &str) -> Self {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(API_VERSION_PARAM, API_VERSION_VALUE)
            .finish();

        Self {
            scheme: SCHEME_DEFAULT.to_string(),
            host: host.into(),
            path: hub_path.trim_matches('/').to_string(),
            query,
        }
    }

    /// Build an endpoint from a full base URL, keeping its query string as is
    pub fn from_url(url: &Url) -> Self {
        let host = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        Self {
            scheme: url.scheme().to_string(),
            host,
            path: url.path().trim_matches('/').to_string(),
            query: url.query().unwrap_or_default().to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Lowercased `scheme://host`, the scope a token is signed for
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host).to_lowercase()
    }

    /// Base path joined with `segment`, query string preserved
    pub fn url_for(&self, segment: &str) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);
        for part in [self.path.as_str(), segment] {
            if !part.is_empty() {
                url.push('/');
                url.push_str(part);
            }
        }

        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }

        url
    }
}

impl fmt::Display for HubEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_for(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "Endpoint=sb://testhub-ns.servicebus.windows.net/;SharedAccessKeyName=testAccessKeyName;SharedAccessKey=testAccessKey";

    #[test]
    fn test_parse_connection_string() {
        let parsed = ConnectionString::parse(VALID).unwrap();

        assert_eq!(parsed.host, "testhub-ns.servicebus.windows.net");
        assert_eq!(parsed.credentials.key_name, "testAccessKeyName");
        assert_eq!(parsed.credentials.key_value, "testAccessKey");
    }

    #[test]
    fn test_parse_keeps_padding_in_key_value() {
        let raw = "Endpoint=sb://ns.example.net/;SharedAccessKeyName=name;SharedAccessKey=abc+/def==;";
        let parsed = ConnectionString::parse(raw).unwrap();
        assert_eq!(parsed.credentials.key_value, "abc+/def==");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ConnectionString::parse("wrong_connection_string").is_err());
        assert!(ConnectionString::parse("Endpoint=sb://host/;SharedAccessKeyName=n").is_err());
        assert!(ConnectionString::parse("Endpoint=sb:///;SharedAccessKeyName=n;SharedAccessKey=k").is_err());
    }

    #[test]
    fn test_parse_lenient_falls_back_to_empty_fields() {
        let parsed = ConnectionString::parse_lenient("wrong_connection_string");
        assert_eq!(parsed, ConnectionString::default());
        assert!(parsed.host.is_empty());
        assert!(parsed.credentials.key_value.is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let credentials = HubCredentials::new("name", "super-secret");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("name"));
    }

    #[test]
    fn test_endpoint_new() {
        let endpoint = HubEndpoint::new("testhub-ns.servicebus.windows.net", "testhub");
        assert_eq!(
            endpoint.to_string(),
            "https://testhub-ns.servicebus.windows.net/testhub?api-version=2015-01"
        );
    }

    #[test]
    fn test_endpoint_with_empty_host() {
        let endpoint = HubEndpoint::new("", "testhub");
        assert_eq!(endpoint.to_string(), "https:///testhub?api-version=2015-01");
        assert_eq!(endpoint.origin(), "https://");
    }

    #[test]
    fn test_endpoint_url_for_segment() {
        let url = Url::parse("https://testHost/testPath?queryParam=queryValue").unwrap();
        let endpoint = HubEndpoint::from_url(&url);

        assert_eq!(
            endpoint.url_for("messages"),
            "https://testhost/testPath/messages?queryParam=queryValue"
        );
        assert_eq!(
            endpoint.url_for("schedulednotifications"),
            "https://testhost/testPath/schedulednotifications?queryParam=queryValue"
        );
    }

    #[test]
    fn test_endpoint_origin_is_lowercased() {
        let endpoint = HubEndpoint::new("TestHost.Example.NET", "Hub");
        assert_eq!(endpoint.origin(), "https://testhost.example.net");
    }

    #[test]
    fn test_endpoint_origin_keeps_port() {
        let url = Url::parse("http://localhost:8080/hub").unwrap();
        let endpoint = HubEndpoint::from_url(&url);
        assert_eq!(endpoint.origin(), "http://localhost:8080");
        assert_eq!(endpoint.url_for("messages"), "http://localhost:8080/hub/messages");
    }
}
