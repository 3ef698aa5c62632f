//! Outbound hub request assembly

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

use crate::connection::HubEndpoint;
use crate::errors::{NotihubError, Result};
use crate::format::Notification;
use crate::signer::SignedToken;

pub const FORMAT_HEADER: &str = "servicebusnotification-format";
pub const TAGS_HEADER: &str = "servicebusnotification-tags";
pub const SCHEDULE_TIME_HEADER: &str = "servicebusnotification-scheduletime";

pub const MESSAGES_SEGMENT: &str = "messages";
pub const SCHEDULED_SEGMENT: &str = "schedulednotifications";

/// Tags are OR'd together by the hub
pub const TAG_SEPARATOR: &str = " || ";

const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Where a notification is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTarget {
    Immediate,
    Scheduled(DateTime<Utc>),
}

impl DeliveryTarget {
    /// Scheduled only when `delivery_time` is strictly after `now`; anything
    /// else is delivered immediately.
    pub fn resolve(delivery_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if delivery_time > now {
            DeliveryTarget::Scheduled(delivery_time)
        } else {
            DeliveryTarget::Immediate
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            DeliveryTarget::Immediate => MESSAGES_SEGMENT,
            DeliveryTarget::Scheduled(_) => SCHEDULED_SEGMENT,
        }
    }
}

/// A fully prepared request, ready for a transport
#[derive(Debug, Clone)]
pub struct HubRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HubRequest {
    pub fn build(
        target: DeliveryTarget,
        endpoint: &HubEndpoint,
        notification: &Notification,
        tags: &[String],
        token: &SignedToken,
        platform_headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(notification.content_type()),
        );
        headers.insert(
            HeaderName::from_static(FORMAT_HEADER),
            HeaderValue::from_static(notification.format().as_str()),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.to_string())
                .map_err(|_| NotihubError::InvalidHeader("Authorization"))?,
        );

        if !tags.is_empty() {
            headers.insert(
                HeaderName::from_static(TAGS_HEADER),
                HeaderValue::from_str(&tags.join(TAG_SEPARATOR))
                    .map_err(|_| NotihubError::InvalidHeader("ServiceBusNotification-Tags"))?,
            );
        }

        if let DeliveryTarget::Scheduled(at) = target {
            headers.insert(
                HeaderName::from_static(SCHEDULE_TIME_HEADER),
                HeaderValue::from_str(&at.format(SCHEDULE_TIME_FORMAT).to_string())
                    .map_err(|_| NotihubError::InvalidHeader("ServiceBusNotification-ScheduleTime"))?,
            );
        }

        headers.extend(platform_headers);

        Ok(Self {
            method: Method::POST,
            url: endpoint.url_for(target.path_segment()),
            headers,
            body: notification.payload().to_vec(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
