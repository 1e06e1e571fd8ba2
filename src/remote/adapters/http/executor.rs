//! Authenticated request execution with retry and backoff.

use super::TokenManager;
use crate::config::RetryPolicy;
use crate::remote::domain::{AccessToken, RemoteError, RemoteResult};
use mockable::Clock;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Request sent through [`RetryingHttpExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RemoteRequest {
    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a `POST` request carrying a JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters in order.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the target URL without query parameters.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Successful response returned by [`RetryingHttpExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    status: u16,
    body: String,
}

impl RemoteResponse {
    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Deserializes the body as JSON; an empty body reads as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> RemoteResult<T> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(|err| RemoteError::Decode(err.to_string()))
    }
}

enum Dispatch {
    Completed(RemoteResponse),
    ConnectionFailed(String),
}

struct RetryableFailure {
    status: Option<u16>,
    message: String,
}

/// Sends authenticated requests, refreshing the token on `401` and retrying
/// transient failures with exponential backoff.
pub struct RetryingHttpExecutor<C>
where
    C: Clock + Send + Sync,
{
    http: reqwest::Client,
    tokens: Arc<TokenManager<C>>,
    retry: RetryPolicy,
}

impl<C> RetryingHttpExecutor<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an executor sharing the given token manager.
    #[must_use]
    pub const fn new(
        http: reqwest::Client,
        tokens: Arc<TokenManager<C>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            tokens,
            retry,
        }
    }

    /// Executes a request and returns its successful response.
    ///
    /// Statuses `429`, `500`, `502`, `503`, `504` and connection failures are
    /// retried until the attempt budget is spent. A `401` triggers one token
    /// refresh and one resend per attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] when no token can be obtained,
    /// [`RemoteError::Transient`] when retries are exhausted, and
    /// [`RemoteError::Permanent`] for any other non-success status.
    pub async fn execute(&self, request: &RemoteRequest) -> RemoteResult<RemoteResponse> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt: u32 = 0;
        loop {
            let failure = match self.send_authenticated(request).await? {
                Dispatch::Completed(response) if is_success(response.status) => {
                    return Ok(response);
                }
                Dispatch::Completed(response) if is_retryable(response.status) => {
                    RetryableFailure {
                        status: Some(response.status),
                        message: response.body,
                    }
                }
                Dispatch::Completed(response) => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        "remote request rejected"
                    );
                    return Err(RemoteError::Permanent {
                        status: response.status,
                        body: response.body,
                    });
                }
                Dispatch::ConnectionFailed(message) => RetryableFailure {
                    status: None,
                    message,
                },
            };
            attempt += 1;
            if attempt >= max_attempts {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    attempts = attempt,
                    "giving up on remote request"
                );
                return Err(RemoteError::Transient {
                    status: failure.status,
                    attempts: attempt,
                    message: failure.message,
                });
            }
            let delay = self.retry.delay_for(attempt - 1);
            warn!(
                method = %request.method,
                url = %request.url,
                status = ?failure.status,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "transient remote failure; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_authenticated(&self, request: &RemoteRequest) -> RemoteResult<Dispatch> {
        let token = self.tokens.get_valid_token().await?;
        let dispatch = self.send_once(request, &token).await?;
        if let Dispatch::Completed(response) = &dispatch
            && response.status == StatusCode::UNAUTHORIZED.as_u16()
        {
            warn!(url = %request.url, "remote rejected bearer token; refreshing once");
            self.tokens.invalidate(&token).await;
            let refreshed = self.tokens.get_valid_token().await?;
            return self.send_once(request, &refreshed).await;
        }
        Ok(dispatch)
    }

    async fn send_once(
        &self,
        request: &RemoteRequest,
        token: &AccessToken,
    ) -> RemoteResult<Dispatch> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .bearer_auth(token.value());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %request.url, "sending remote request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) if err.is_builder() => return Err(RemoteError::InvalidUrl(err.to_string())),
            Err(err) => return Ok(Dispatch::ConnectionFailed(err.to_string())),
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Ok(Dispatch::Completed(RemoteResponse { status, body })),
            Err(err) => Ok(Dispatch::ConnectionFailed(err.to_string())),
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_retryable(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}
