/// Notification hub configuration loaded from the environment
use std::time::Duration;

use crate::clock::{DefaultExpiry, DEFAULT_TOKEN_TTL_SECS};
#[cfg(test)]
use crate::clock::MAX_TOKEN_TTL_SECS;
use crate::connection::{ConnectionString, HubEndpoint};
use crate::errors::{NotihubError, Result};
use crate::hub::NotificationHub;
use crate::transport::HttpTransport;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct HubConfig {
    pub connection_string: String,
    pub hub_path: String,
    /// Lifetime of each signed token
    pub token_ttl_secs: i64,
    pub http_timeout_secs: u64,
}

impl HubConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// when present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            connection_string: required("NOTIFICATION_HUB_CONNECTION_STRING")?,
            hub_path: required("NOTIFICATION_HUB_PATH")?,
            token_ttl_secs: parsed(
                "NOTIFICATION_HUB_TOKEN_TTL_SECS",
                DEFAULT_TOKEN_TTL_SECS,
            )?,
            http_timeout_secs: parsed(
                "NOTIFICATION_HUB_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
        })
    }

    /// Build a hub client. Unlike [`NotificationHub::new`], a malformed
    /// connection string is reported here.
    pub fn build_hub(&self) -> Result<NotificationHub> {
        let expiry = DefaultExpiry::from_secs(self.token_ttl_secs)?;
        let connection = ConnectionString::parse(&self.connection_string)?;
        let transport =
            HttpTransport::with_timeout(Duration::from_secs(self.http_timeout_secs))?;

        Ok(NotificationHub::from_parts(
            connection.credentials,
            HubEndpoint::new(connection.host, &self.hub_path),
        )
        .with_transport(transport)
        .with_expiry_provider(expiry))
    }
}

impl std::fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConfig")
            .field("connection_string", &"<redacted>")
            .field("hub_path", &self.hub_path)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| NotihubError::Config(format!("{} must be set", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| NotihubError::Config(format!("{} has invalid value '{}'", key, value))),
        Err(_) => Ok(default),
    }
}
