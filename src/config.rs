//! Integration settings.
//!
//! Settings deserialize from JSON with defaults for everything except the
//! remote base URL and client credentials, or load from `CASEBRIDGE_*`
//! environment variables through an injectable lookup function so tests never
//! touch the process environment.

use chrono::{FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default OAuth token endpoint of the remote system.
pub const DEFAULT_TOKEN_URL: &str = "https://api.thomsonreuters.com/legalone/oauth";

/// Environment variable prefix shared by every setting.
pub const ENV_PREFIX: &str = "CASEBRIDGE_";

/// Errors raised while loading or validating settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting has no value.
    #[error("missing required setting {0}")]
    Missing(String),

    /// A setting holds a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A JSON settings document could not be parsed.
    #[error("failed to parse settings document: {0}")]
    Parse(String),
}

/// Retry behaviour for transient remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Returns the backoff to wait after the given zero-based failed attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u64.checked_pow(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
        }
    }
}

/// Connection settings for the remote case-management API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApiConfig {
    /// Base URL that resource paths are appended to.
    pub base_url: String,
    /// OAuth client-credentials token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Seconds subtracted from the token expiry before it is considered stale.
    #[serde(default = "default_token_leeway_secs")]
    pub token_leeway_secs: i64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Page size requested from paginated collections.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Lifetime of a cached catalog in seconds.
    #[serde(default = "default_catalog_ttl_secs")]
    pub catalog_ttl_secs: i64,
    /// Collection searched when a case is absent from the lawsuit collection.
    #[serde(default = "default_fallback_case_endpoint")]
    pub fallback_case_endpoint: String,
}

impl RemoteApiConfig {
    /// Creates settings with defaults for everything but the endpoint and
    /// credentials.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token_url: default_token_url(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            request_timeout_secs: default_request_timeout_secs(),
            token_leeway_secs: default_token_leeway_secs(),
            retry: RetryPolicy::default(),
            page_size: default_page_size(),
            catalog_ttl_secs: default_catalog_ttl_secs(),
            fallback_case_endpoint: default_fallback_case_endpoint(),
        }
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the page size used for catalog listings.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the token leeway.
    #[must_use]
    pub fn token_leeway(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.token_leeway_secs).unwrap_or_default()
    }

    /// Returns the catalog cache lifetime.
    #[must_use]
    pub fn catalog_ttl(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.catalog_ttl_secs).unwrap_or_default()
    }
}

impl fmt::Debug for RemoteApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteApiConfig")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("retry", &self.retry)
            .field("page_size", &self.page_size)
            .field("catalog_ttl_secs", &self.catalog_ttl_secs)
            .field("fallback_case_endpoint", &self.fallback_case_endpoint)
            .finish()
    }
}

/// Settings applied while processing batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Minimum spacing between consecutive items, in milliseconds.
    pub item_interval_ms: u64,
    /// UTC offset, in hours, of the office calendar used for deadlines.
    pub local_utc_offset_hours: i32,
    /// Task type assigned to created tasks.
    pub task_type_id: i64,
    /// Task subtype assigned to created tasks unless overridden per item.
    pub task_subtype_id: i64,
    /// Initial status of created tasks.
    pub task_status_id: i64,
}

impl BatchConfig {
    /// Returns the spacing between consecutive items.
    #[must_use]
    pub const fn item_interval(&self) -> Duration {
        Duration::from_millis(self.item_interval_ms)
    }

    /// Returns the office calendar offset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the offset lies outside ±23 hours.
    pub fn local_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.local_utc_offset_hours
            .checked_mul(3_600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: env_key("LOCAL_UTC_OFFSET_HOURS"),
                value: self.local_utc_offset_hours.to_string(),
                reason: "offset must lie within ±23 hours".to_owned(),
            })
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            item_interval_ms: 100,
            local_utc_offset_hours: -3,
            task_type_id: 26,
            task_subtype_id: 1132,
            task_status_id: 0,
        }
    }
}

/// Complete integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Remote API connection settings.
    pub remote: RemoteApiConfig,
    /// Batch processing settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl IntegrationConfig {
    /// Parses and validates a JSON settings document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and the
    /// validation errors of [`IntegrationConfig::validate`].
    pub fn from_json(document: &[u8]) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_slice(document).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`IntegrationConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which receives full variable names
    /// such as `CASEBRIDGE_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the base URL or credentials are
    /// absent and [`ConfigError::Invalid`] when a value cannot be parsed or
    /// fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = EnvSource { lookup };
        let mut remote = RemoteApiConfig::new(
            source.required("BASE_URL")?,
            source.required("CLIENT_ID")?,
            source.required("CLIENT_SECRET")?,
        );
        if let Some(token_url) = source.text("TOKEN_URL") {
            remote.token_url = token_url;
        }
        if let Some(endpoint) = source.text("FALLBACK_CASE_ENDPOINT") {
            remote.fallback_case_endpoint = endpoint;
        }
        source.parse_into("REQUEST_TIMEOUT_SECS", &mut remote.request_timeout_secs)?;
        source.parse_into("TOKEN_LEEWAY_SECS", &mut remote.token_leeway_secs)?;
        source.parse_into("MAX_ATTEMPTS", &mut remote.retry.max_attempts)?;
        source.parse_into("RETRY_BASE_DELAY_MS", &mut remote.retry.base_delay_ms)?;
        source.parse_into("PAGE_SIZE", &mut remote.page_size)?;
        source.parse_into("CATALOG_TTL_SECS", &mut remote.catalog_ttl_secs)?;

        let mut batch = BatchConfig::default();
        source.parse_into("ITEM_INTERVAL_MS", &mut batch.item_interval_ms)?;
        source.parse_into("LOCAL_UTC_OFFSET_HOURS", &mut batch.local_utc_offset_hours)?;
        source.parse_into("TASK_TYPE_ID", &mut batch.task_type_id)?;
        source.parse_into("TASK_SUBTYPE_ID", &mut batch.task_subtype_id)?;
        source.parse_into("TASK_STATUS_ID", &mut batch.task_status_id)?;

        let config = Self { remote, batch };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unparseable base or token URL,
    /// a zero attempt budget, a zero page size, or an out-of-range offset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("BASE_URL", &self.remote.base_url)?;
        validate_url("TOKEN_URL", &self.remote.token_url)?;
        if self.remote.retry.max_attempts == 0 {
            return Err(invalid("MAX_ATTEMPTS", "0", "at least one attempt is required"));
        }
        if self.remote.page_size == 0 {
            return Err(invalid("PAGE_SIZE", "0", "page size must be positive"));
        }
        if !self.remote.fallback_case_endpoint.starts_with('/') {
            return Err(invalid(
                "FALLBACK_CASE_ENDPOINT",
                &self.remote.fallback_case_endpoint,
                "endpoint must start with '/'",
            ));
        }
        self.batch.local_offset().map(|_| ())
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn text(&self, name: &str) -> Option<String> {
        (self.lookup)(&env_key(name))
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.text(name).ok_or_else(|| ConfigError::Missing(env_key(name)))
    }

    fn parse_into<T>(&self, name: &str, target: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(raw) = self.text(name) else {
            return Ok(());
        };
        *target = raw
            .parse()
            .map_err(|err: T::Err| invalid(name, &raw, &err.to_string()))?;
        Ok(())
    }
}

fn env_key(name: &str) -> String {
    format!("{ENV_PREFIX}{name}")
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: env_key(name),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|err| invalid(name, value, &err.to_string()))
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_token_leeway_secs() -> i64 {
    120
}

const fn default_page_size() -> u32 {
    30
}

const fn default_catalog_ttl_secs() -> i64 {
    3_600
}

fn default_fallback_case_endpoint() -> String {
    "/ProceduralIssues".to_owned()
}
