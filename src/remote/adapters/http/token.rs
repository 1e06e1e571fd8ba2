//! OAuth client-credentials token management.

use crate::config::RemoteApiConfig;
use crate::remote::domain::{AccessToken, AuthError, lenient_i64};
use chrono::TimeDelta;
use mockable::Clock;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const DEFAULT_EXPIRES_IN_SECS: i64 = 1_800;
const MAX_EXPIRES_IN_SECS: i64 = 366 * 24 * 3_600;

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// Keeps a single bearer token fresh for the whole process.
///
/// The token lives behind an async mutex. Callers that find it stale while
/// another caller is refreshing wait on the lock and then reuse the refreshed
/// token, so concurrent callers trigger at most one exchange.
pub struct TokenManager<C>
where
    C: Clock + Send + Sync,
{
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    leeway: TimeDelta,
    clock: Arc<C>,
    current: Mutex<Option<AccessToken>>,
}

impl<C> TokenManager<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a token manager that has not fetched a token yet.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &RemoteApiConfig, clock: Arc<C>) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            leeway: config.token_leeway(),
            clock,
            current: Mutex::new(None),
        }
    }

    /// Returns a token that stays valid for at least the configured leeway,
    /// exchanging credentials when the cached one is missing or stale.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the exchange fails. A stale token is never
    /// returned in that case.
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref()
            && token.is_usable_at(self.clock.utc(), self.leeway)
        {
            return Ok(token.clone());
        }

        let refreshed = self.exchange_credentials().await?;
        *current = Some(refreshed.clone());
        Ok(refreshed)
    }

    /// Discards the cached token if it is still `rejected`, so the next call
    /// exchanges credentials.
    ///
    /// A token refreshed by another caller since `rejected` was handed out is
    /// kept.
    pub async fn invalidate(&self, rejected: &AccessToken) {
        let mut current = self.current.lock().await;
        if current.as_ref() == Some(rejected) {
            *current = None;
            debug!("cached access token invalidated");
        } else {
            debug!("access token already replaced; keeping the cached one");
        }
    }

    async fn exchange_credentials(&self) -> Result<AccessToken, AuthError> {
        info!(token_url = %self.token_url, "requesting access token");
        let response = self
            .http
            .post(&self.token_url)
            .query(&[("grant_type", "client_credentials")])
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token exchange rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|err| AuthError::MalformedResponse(err.to_string()))?;
        if grant.access_token.trim().is_empty() {
            return Err(AuthError::MalformedResponse(
                "access_token is empty".to_owned(),
            ));
        }

        let expires_in = parse_expires_in(grant.expires_in.as_ref())?;
        let expires_at = self.clock.utc() + TimeDelta::seconds(expires_in);
        info!(%expires_at, "access token refreshed");
        Ok(AccessToken::new(grant.access_token, expires_at))
    }
}

fn parse_expires_in(value: Option<&Value>) -> Result<i64, AuthError> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_EXPIRES_IN_SECS),
        Some(raw) => lenient_i64(raw)
            .map(|seconds| seconds.clamp(0, MAX_EXPIRES_IN_SECS))
            .ok_or_else(|| AuthError::MalformedResponse(format!("invalid expires_in: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_expires_in;
    use crate::remote::domain::AuthError;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(None, 1_800)]
    #[case(Some(Value::Null), 1_800)]
    #[case(Some(json!(3600)), 3_600)]
    #[case(Some(json!("900")), 900)]
    #[case(Some(json!(-5)), 0)]
    fn expires_in_accepts_numbers_and_numeric_strings(
        #[case] raw: Option<Value>,
        #[case] expected: i64,
    ) {
        assert_eq!(parse_expires_in(raw.as_ref()), Ok(expected));
    }

    #[rstest]
    fn expires_in_rejects_non_numeric_text() {
        let result = parse_expires_in(Some(&json!("soon")));

        assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
    }
}
