use thiserror::Error;

/// Result type alias for notification hub operations
pub type Result<T> = std::result::Result<T, NotihubError>;

/// Notification hub client error types
#[derive(Error, Debug)]
pub enum NotihubError {
    #[error("Invalid notification format: {0}")]
    InvalidFormat(String),

    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("notification hub request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Errors reported by a [`crate::transport::HubTransport`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_text_is_preserved() {
        let err: NotihubError = TransportError::Request("test error".to_string()).into();
        assert!(err.to_string().contains("test error"));
    }

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 401,
            body: "ExpiredToken".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 401: ExpiredToken");
    }
}
