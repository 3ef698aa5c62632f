/// Platform-specific transport headers derived from a notification payload
///
/// Only Apple payloads need extra headers: APNs rejects background pushes
/// sent with alert priority, so the push type and priority follow the
/// payload's `content-available` flag.
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::warn;

use crate::format::{Notification, NotificationFormat};

pub const APNS_PUSH_TYPE_HEADER: &str = "x-apns-push-type";
pub const APNS_PRIORITY_HEADER: &str = "x-apns-priority";

/// APNs push type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsPushType {
    Alert,
    Background,
}

impl ApnsPushType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApnsPushType::Alert => "alert",
            ApnsPushType::Background => "background",
        }
    }

    pub fn priority(&self) -> ApnsPriority {
        match self {
            ApnsPushType::Alert => ApnsPriority::High,
            ApnsPushType::Background => ApnsPriority::Low,
        }
    }
}

/// APNs Notification Priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApnsPriority {
    /// Immediate delivery
    High,
    /// Background delivery
    Low,
}

impl ApnsPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApnsPriority::High => "10",
            ApnsPriority::Low => "5",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApplePayload {
    #[serde(default)]
    aps: Option<Aps>,
}

#[derive(Debug, Deserialize)]
struct Aps {
    #[serde(rename = "content-available", alias = "contentAvailable", default)]
    content_available: Option<i64>,
}

/// Push type for an Apple payload. Anything that does not parse, or does not
/// set `content-available` to 1, is an alert.
pub fn apns_push_type(payload: &[u8]) -> ApnsPushType {
    match serde_json::from_slice::<ApplePayload>(payload) {
        Ok(parsed) => match parsed.aps.and_then(|aps| aps.content_available) {
            Some(1) => ApnsPushType::Background,
            _ => ApnsPushType::Alert,
        },
        Err(e) => {
            warn!("Apple payload is not valid JSON, sending as alert: {}", e);
            ApnsPushType::Alert
        }
    }
}

/// Extra headers for `notification`, empty for every format except Apple
pub fn platform_headers(notification: &Notification) -> Vec<(HeaderName, HeaderValue)> {
    match notification.format() {
        NotificationFormat::Apple => {
            let push_type = apns_push_type(notification.payload());
            vec![
                (
                    HeaderName::from_static(APNS_PUSH_TYPE_HEADER),
                    HeaderValue::from_static(push_type.as_str()),
                ),
                (
                    HeaderName::from_static(APNS_PRIORITY_HEADER),
                    HeaderValue::from_static(push_type.priority().as_str()),
                ),
            ]
        }
        _ => Vec::new(),
    }
}
