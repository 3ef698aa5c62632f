//! Time sources for token expiry and schedule decisions.
//!
//! Both are read once per request. Tests substitute closures returning fixed
//! instants so that signatures are reproducible.
use chrono::{DateTime, Duration, Utc};

use crate::errors::{NotihubError, Result};

/// Default lifetime of a signed token, in seconds
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Longest accepted token lifetime (one year), in seconds
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

/// Produces the expiry instant written into a signed token
pub trait ExpiryProvider: Send + Sync {
    fn expiry(&self) -> DateTime<Utc>;
}

impl<F> ExpiryProvider for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn expiry(&self) -> DateTime<Utc> {
        self()
    }
}

/// Wall-clock now plus a fixed time-to-live
#[derive(Debug, Clone, Copy)]
pub struct DefaultExpiry {
    ttl: Duration,
}

impl DefaultExpiry {
    /// TTL must be positive and at most [`MAX_TOKEN_TTL_SECS`]
    pub fn new(ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() || ttl.num_seconds() > MAX_TOKEN_TTL_SECS {
            return Err(NotihubError::Config(format!(
                "token TTL must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECS,
                ttl.num_seconds()
            )));
        }

        Ok(Self { ttl })
    }

    /// Same bounds as [`Self::new`], from a second count
    pub fn from_secs(secs: i64) -> Result<Self> {
        let ttl = Duration::try_seconds(secs).ok_or_else(|| {
            NotihubError::Config(format!("token TTL of {} seconds is out of range", secs))
        })?;
        Self::new(ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for DefaultExpiry {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }
}

impl ExpiryProvider for DefaultExpiry {
    fn expiry(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Current instant, used to decide between immediate and scheduled delivery
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
