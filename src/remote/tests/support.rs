//! HTTP fixtures shared by remote adapter tests.

use crate::config::{RemoteApiConfig, RetryPolicy};
use crate::remote::adapters::http::{RetryingHttpExecutor, TokenManager};
use crate::test_support::ManualClock;
use mockito::{Matcher, Mock, ServerGuard};
use std::sync::Arc;

pub const BASIC_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

pub fn config_for(server: &ServerGuard) -> RemoteApiConfig {
    RemoteApiConfig::new(format!("{}/api", server.url()), "client", "secret")
        .with_token_url(format!("{}/oauth", server.url()))
        .with_retry(RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1,
        })
}

pub fn token_manager(
    config: &RemoteApiConfig,
    clock: Arc<ManualClock>,
) -> Arc<TokenManager<ManualClock>> {
    Arc::new(TokenManager::new(reqwest::Client::new(), config, clock))
}

pub fn executor(
    config: &RemoteApiConfig,
    clock: Arc<ManualClock>,
) -> Arc<RetryingHttpExecutor<ManualClock>> {
    Arc::new(RetryingHttpExecutor::new(
        reqwest::Client::new(),
        token_manager(config, clock),
        config.retry,
    ))
}

pub async fn token_mock(server: &mut ServerGuard, expected_hits: usize) -> Mock {
    server
        .mock("POST", "/oauth")
        .match_query(Matcher::UrlEncoded(
            "grant_type".to_owned(),
            "client_credentials".to_owned(),
        ))
        .match_header("authorization", BASIC_AUTH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"token-abc","expires_in":1800}"#)
        .expect(expected_hits)
        .create_async()
        .await
}
