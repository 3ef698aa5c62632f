use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::clock::{Clock, DefaultExpiry, ExpiryProvider, SystemClock};
use crate::connection::{ConnectionString, HubCredentials, HubEndpoint};
use crate::decorator;
use crate::errors::{NotihubError, Result};
use crate::format::Notification;
use crate::request::{DeliveryTarget, HubRequest};
use crate::signer::SasTokenSigner;
use crate::transport::{HttpTransport, HubTransport};

/// Notification hub client
///
/// Sends notifications immediately or schedules them for later delivery.
/// Holds no mutable state, so one instance can be shared across tasks.
#[derive(Clone)]
pub struct NotificationHub {
    signer: SasTokenSigner,
    endpoint: HubEndpoint,
    transport: Arc<dyn HubTransport>,
    expiry: Arc<dyn ExpiryProvider>,
    clock: Arc<dyn Clock>,
}

impl NotificationHub {
    /// Create a hub client from a connection string and hub path.
    ///
    /// A malformed connection string does not fail here; see
    /// [`ConnectionString::parse_lenient`].
    pub fn new(connection_string: &str, hub_path: &str) -> Self {
        let parsed = ConnectionString::parse_lenient(connection_string);
        Self::from_parts(parsed.credentials, HubEndpoint::new(parsed.host, hub_path))
    }

    pub fn from_parts(credentials: HubCredentials, endpoint: HubEndpoint) -> Self {
        Self {
            signer: SasTokenSigner::new(credentials),
            endpoint,
            transport: Arc::new(HttpTransport::default()),
            expiry: Arc::new(DefaultExpiry::default()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_transport(mut self, transport: impl HubTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_expiry_provider(mut self, expiry: impl ExpiryProvider + 'static) -> Self {
        self.expiry = Arc::new(expiry);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn endpoint(&self) -> &HubEndpoint {
        &self.endpoint
    }

    pub fn key_name(&self) -> &str {
        self.signer.key_name()
    }

    /// Send a notification for immediate delivery
    ///
    /// # Arguments
    /// * `cancel` - Forwarded to the transport
    /// * `notification` - Format and payload to deliver
    /// * `tags` - Audience filter, OR'd together; empty broadcasts
    ///
    /// # Returns
    /// The hub's raw response body
    pub async fn send(
        &self,
        cancel: &CancellationToken,
        notification: &Notification,
        tags: &[String],
    ) -> Result<Vec<u8>> {
        self.dispatch(cancel, notification, tags, DeliveryTarget::Immediate)
            .await
    }

    /// Schedule a notification for `delivery_time`.
    ///
    /// A delivery time that is not in the future is sent immediately instead.
    pub async fn schedule(
        &self,
        cancel: &CancellationToken,
        notification: &Notification,
        tags: &[String],
        delivery_time: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        let target = DeliveryTarget::resolve(delivery_time, self.clock.now());

        if target == DeliveryTarget::Immediate {
            info!(
                "Delivery time {} is not in the future, sending immediately",
                delivery_time
            );
        }

        self.dispatch(cancel, notification, tags, target).await
    }

    async fn dispatch(
        &self,
        cancel: &CancellationToken,
        notification: &Notification,
        tags: &[String],
        target: DeliveryTarget,
    ) -> Result<Vec<u8>> {
        let platform_headers = decorator::platform_headers(notification);
        let token = self.signer.sign(&self.endpoint, self.expiry.expiry())?;
        let request = HubRequest::build(
            target,
            &self.endpoint,
            notification,
            tags,
            &token,
            platform_headers,
        )?;

        debug!(
            url = %request.url,
            format = %notification.format(),
            tagged = !tags.is_empty(),
            "Dispatching notification"
        );

        self.transport
            .execute(request, cancel.clone())
            .await
            .map_err(|e| {
                error!("Notification hub request to {} failed: {}", target.path_segment(), e);
                NotihubError::Transport(e)
            })
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_hub() {
        let hub = NotificationHub::new(
            "Endpoint=sb://testhub-ns.servicebus.windows.net/;SharedAccessKeyName=testAccessKeyName;SharedAccessKey=testAccessKey",
            "testhub",
        );

        assert_eq!(hub.key_name(), "testAccessKeyName");
        assert_eq!(
            hub.endpoint().to_string(),
            "https://testhub-ns.servicebus.windows.net/testhub?api-version=2015-01"
        );
    }

    #[test]
    fn test_new_notification_hub_malformed_connection_string() {
        let hub = NotificationHub::new("wrong_connection_string", "testhub");

        assert_eq!(hub.key_name(), "");
        assert_eq!(hub.endpoint().to_string(), "https:///testhub?api-version=2015-01");
    }

    #[test]
    fn test_hub_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NotificationHub>();
    }

    #[test]
    fn test_debug_hides_key_value() {
        let hub = NotificationHub::from_parts(
            HubCredentials::new("name", "super-secret"),
            HubEndpoint::new("host", "hub"),
        );

        assert!(!format!("{:?}", hub).contains("super-secret"));
    }
}
