use chrono::{DateTime, Utc};
use std::time::Duration;

/// AWS-style credentials loaded from a shared credentials file (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Credentials plus an expiration instant (spec §3). The expiration is
/// always `constructed_at + refresh_interval`, never computed any other
/// way, which is what makes the invariant ("expiration is strictly greater
/// than the construction instant by the configured refresh interval")
/// trivially true by construction rather than something callers must check.
#[derive(Debug, Clone)]
pub struct CredentialsRefreshState {
    pub credentials: Credentials,
    constructed_at: DateTime<Utc>,
    refresh_interval: Duration,
}

impl CredentialsRefreshState {
    pub fn new(credentials: Credentials, constructed_at: DateTime<Utc>, refresh_interval: Duration) -> Self {
        Self {
            credentials,
            constructed_at,
            refresh_interval,
        }
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.constructed_at
            + chrono::Duration::from_std(self.refresh_interval).unwrap_or(chrono::Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration()
    }
}
