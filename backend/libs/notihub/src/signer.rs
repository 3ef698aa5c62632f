// Shared access signature tokens - HMAC-SHA256 over the hub origin and expiry
// The hub recomputes the signature, so every byte of the input matters.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use crate::connection::{HubCredentials, HubEndpoint};
use crate::errors::{NotihubError, Result};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_SCHEME: &str = "SharedAccessSignature";

/// Signs requests with a shared access key
#[derive(Clone, Debug)]
pub struct SasTokenSigner {
    credentials: HubCredentials,
}

impl SasTokenSigner {
    pub fn new(credentials: HubCredentials) -> Self {
        Self { credentials }
    }

    pub fn key_name(&self) -> &str {
        &self.credentials.key_name
    }

    /// Sign a token scoped to the endpoint's origin, valid until `expiry`
    pub fn sign(&self, endpoint: &HubEndpoint, expiry: DateTime<Utc>) -> Result<SignedToken> {
        let encoded_uri = query_escape(&endpoint.origin());
        let expiry = expiry.timestamp();

        // Payload: encoded uri + "\n" + expiry seconds
        let payload = format!("{}\n{}", encoded_uri, expiry);
        let signature = self.compute_signature(&payload)?;

        Ok(SignedToken {
            encoded_uri,
            signature,
            expiry,
            key_name: self.credentials.key_name.clone(),
        })
    }

    fn compute_signature(&self, payload: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.credentials.key_value.as_bytes())
            .map_err(|e| NotihubError::Signing(format!("HMAC error: {}", e)))?;

        mac.update(payload.as_bytes());
        let bytes = mac.finalize().into_bytes();

        Ok(general_purpose::STANDARD.encode(bytes))
    }
}

/// Query-string escaping: space becomes `+`, reserved bytes are percent-encoded
fn query_escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// A token for a single request. Never cached: each request signs its own.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken {
    encoded_uri: String,
    signature: String,
    expiry: i64,
    key_name: String,
}

impl SignedToken {
    /// Base64 HMAC-SHA256 signature, before percent-encoding
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Unix seconds the token expires at
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    pub fn encoded_uri(&self) -> &str {
        &self.encoded_uri
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sr={}&sig={}&se={}&skn={}",
            TOKEN_SCHEME,
            self.encoded_uri,
            query_escape(&self.signature),
            self.expiry,
            query_escape(&self.key_name)
        )
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedToken")
            .field("encoded_uri", &self.encoded_uri)
            .field("expiry", &self.expiry)
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}
