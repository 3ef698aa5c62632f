//! Notihub
//!
//! Client for a cloud push-notification hub. It signs each request with a
//! shared access signature, formats platform headers and sends notifications
//! either immediately or scheduled for later delivery.
//!
//! It handles:
//! - Shared access token signing (HMAC-SHA256, time scoped)
//! - Platform formats and their content types
//! - APNs push type and priority derived from Apple payloads
//! - Tag expressions for audience filtering
//! - Immediate and scheduled delivery, falling back to immediate for past times
//!
//! HTTP execution is behind [`HubTransport`]; [`HttpTransport`] is the
//! reqwest implementation used by default.

pub mod clock;
pub mod config;
pub mod connection;
pub mod decorator;
pub mod errors;
pub mod format;
pub mod hub;
pub mod request;
pub mod signer;
pub mod transport;

pub use clock::{Clock, DefaultExpiry, ExpiryProvider, SystemClock};
pub use config::HubConfig;
pub use connection::{ConnectionString, HubCredentials, HubEndpoint};
pub use errors::{NotihubError, Result, TransportError};
pub use format::{Notification, NotificationFormat};
pub use hub::NotificationHub;
pub use request::{DeliveryTarget, HubRequest};
pub use signer::{SasTokenSigner, SignedToken};
pub use transport::{HttpTransport, HubTransport};

pub use tokio_util::sync::CancellationToken;
