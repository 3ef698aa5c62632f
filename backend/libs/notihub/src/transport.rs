use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{NotihubError, Result, TransportError};
use crate::request::HubRequest;

/// Executes prepared hub requests.
///
/// Implementations own retry and timeout policy and must honour `cancel`.
#[async_trait::async_trait]
pub trait HubTransport: Send + Sync {
    /// Send `request` and return the raw response body.
    ///
    /// # Returns
    /// The body on a 2xx response, `Err(TransportError)` on network failure,
    /// any other status, or cancellation
    async fn execute(
        &self,
        request: HubRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<Vec<u8>, TransportError>;
}

/// reqwest-backed transport
#[derive(Clone, Default)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Transport whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotihubError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    async fn send(&self, request: HubRequest) -> std::result::Result<Vec<u8>, TransportError> {
        let response = self
            .http_client
            .request(request.method, request.url.as_str())
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("Failed to read response: {}", e)))?;

        debug!("Hub responded with status {}", status);

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl HubTransport for HttpTransport {
    async fn execute(
        &self,
        request: HubRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.send(request) => result,
        }
    }
}
