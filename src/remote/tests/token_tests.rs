//! Token manager behaviour against a mock authorization endpoint.

use super::support::{config_for, token_manager, token_mock};
use crate::remote::domain::AuthError;
use crate::test_support::ManualClock;
use chrono::TimeDelta;
use mockito::Server;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::midweek())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fresh_token_is_reused_without_a_second_exchange(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let mock = token_mock(&mut server, 1).await;
    let tokens = token_manager(&config_for(&server), Arc::clone(&clock));

    let first = tokens.get_valid_token().await.expect("first exchange should succeed");
    clock.advance(TimeDelta::seconds(600));
    let second = tokens.get_valid_token().await.expect("cached token should be served");

    assert_eq!(first, second);
    assert_eq!(first.value(), "token-abc");
    assert_eq!(first.expires_at(), ManualClock::midweek().now() + TimeDelta::seconds(1_800));
    mock.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_inside_the_leeway_window_is_refreshed(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let mock = token_mock(&mut server, 2).await;
    let tokens = token_manager(&config_for(&server), Arc::clone(&clock));

    tokens.get_valid_token().await.expect("first exchange should succeed");
    clock.advance(TimeDelta::seconds(1_800 - 120));
    tokens.get_valid_token().await.expect("refresh should succeed");

    mock.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_callers_share_a_single_refresh(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let mock = token_mock(&mut server, 1).await;
    let tokens = token_manager(&config_for(&server), clock);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&tokens);
            tokio::spawn(async move { shared.get_valid_token().await })
        })
        .collect();
    for handle in handles {
        let token = handle
            .await
            .expect("task should not panic")
            .expect("token should be issued");
        assert_eq!(token.value(), "token-abc");
    }

    mock.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalidate_forces_the_next_call_to_refresh(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let mock = token_mock(&mut server, 2).await;
    let tokens = token_manager(&config_for(&server), clock);

    let rejected = tokens.get_valid_token().await.expect("first exchange should succeed");
    tokens.invalidate(&rejected).await;
    tokens.get_valid_token().await.expect("refresh should succeed");

    mock.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalidating_a_replaced_token_keeps_the_fresh_one(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let mock = token_mock(&mut server, 2).await;
    let tokens = token_manager(&config_for(&server), Arc::clone(&clock));

    let stale = tokens.get_valid_token().await.expect("first exchange should succeed");
    clock.advance(TimeDelta::seconds(60));
    tokens.invalidate(&stale).await;
    let fresh = tokens.get_valid_token().await.expect("refresh should succeed");
    tokens.invalidate(&stale).await;
    let reused = tokens.get_valid_token().await.expect("cached token should be served");

    assert_ne!(stale, fresh);
    assert_eq!(reused, fresh);
    mock.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn string_expiry_is_accepted(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"access_token":"t","expires_in":"60"}"#)
        .create_async()
        .await;
    let tokens = token_manager(&config_for(&server), Arc::clone(&clock));

    let token = tokens.get_valid_token().await.expect("exchange should succeed");

    assert_eq!(token.expires_at(), clock.now() + TimeDelta::seconds(60));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_exchange_surfaces_an_auth_error(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .with_body("invalid_client")
        .create_async()
        .await;
    let tokens = token_manager(&config_for(&server), clock);

    let result = tokens.get_valid_token().await;

    assert_eq!(
        result,
        Err(AuthError::Rejected {
            status: 401,
            body: "invalid_client".to_owned(),
        })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn body_without_access_token_is_malformed(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"expires_in":1800}"#)
        .create_async()
        .await;
    let tokens = token_manager(&config_for(&server), clock);

    let result = tokens.get_valid_token().await;

    assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
}
