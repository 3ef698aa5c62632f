/// Notification formats and the notification value sent through the hub
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{NotihubError, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_XML: &str = "application/xml";

/// Target platform (or template) a notification payload is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFormat {
    /// Template notification, expanded by the hub per registration
    Template,
    /// Firebase / Google Cloud Messaging
    #[serde(rename = "gcm")]
    Android,
    /// Apple Push Notification Service
    Apple,
    /// Baidu Cloud Push
    Baidu,
    /// Amazon Device Messaging
    #[serde(rename = "adm")]
    Kindle,
    /// Windows Push Notification Services
    Windows,
    /// Microsoft Push Notification Service
    WindowsPhone,
}

impl NotificationFormat {
    pub const ALL: [NotificationFormat; 7] = [
        NotificationFormat::Template,
        NotificationFormat::Android,
        NotificationFormat::Apple,
        NotificationFormat::Baidu,
        NotificationFormat::Kindle,
        NotificationFormat::Windows,
        NotificationFormat::WindowsPhone,
    ];

    /// Wire value sent in the `ServiceBusNotification-Format` header
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationFormat::Template => "template",
            NotificationFormat::Android => "gcm",
            NotificationFormat::Apple => "apple",
            NotificationFormat::Baidu => "baidu",
            NotificationFormat::Kindle => "adm",
            NotificationFormat::Windows => "windows",
            NotificationFormat::WindowsPhone => "windowsphone",
        }
    }

    /// Content type of payloads written for this format
    pub fn content_type(&self) -> &'static str {
        match self {
            NotificationFormat::Windows | NotificationFormat::WindowsPhone => CONTENT_TYPE_XML,
            NotificationFormat::Template
            | NotificationFormat::Android
            | NotificationFormat::Apple
            | NotificationFormat::Baidu
            | NotificationFormat::Kindle => CONTENT_TYPE_JSON,
        }
    }

    /// Whether `value` names a known format
    pub fn is_valid(value: &str) -> bool {
        value.parse::<NotificationFormat>().is_ok()
    }
}

impl FromStr for NotificationFormat {
    type Err = NotihubError;

    fn from_str(s: &str) -> Result<Self> {
        NotificationFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| NotihubError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for NotificationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pre-serialized payload paired with the format it targets.
///
/// The payload is sent to the hub byte for byte; it is never inspected except
/// to derive Apple push headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    format: NotificationFormat,
    payload: Vec<u8>,
}

impl Notification {
    /// Create a notification from a wire format name.
    ///
    /// Unknown formats are rejected here, so a constructed notification is
    /// always sendable.
    pub fn new(format: &str, payload: impl Into<Vec<u8>>) -> Result<Self> {
        let format = format.parse::<NotificationFormat>()?;
        Ok(Self::from_format(format, payload))
    }

    pub fn from_format(format: NotificationFormat, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            payload: payload.into(),
        }
    }

    pub fn format(&self) -> NotificationFormat {
        self.format
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "&{{{} {}}}",
            self.format,
            String::from_utf8_lossy(&self.payload)
        )
    }
}
