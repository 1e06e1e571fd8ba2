//! Bearer token issued by the remote authorization endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Access token together with its absolute expiry instant.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires at the given instant.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Returns the raw bearer value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry instant reported by the authorization endpoint.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` while `now` is earlier than the expiry minus `leeway`.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>, leeway: TimeDelta) -> bool {
        self.expires_at
            .checked_sub_signed(leeway)
            .is_some_and(|deadline| now < deadline)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
