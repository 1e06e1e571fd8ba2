//! Retry, backoff, and re-authentication behaviour of the executor.

use super::support::{config_for, executor, token_mock};
use crate::remote::adapters::http::RemoteRequest;
use crate::remote::domain::RemoteError;
use crate::test_support::ManualClock;
use mockito::{Server, ServerGuard};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::Arc;

#[fixture]
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::midweek())
}

fn lawsuits_request(server: &ServerGuard) -> RemoteRequest {
    RemoteRequest::get(format!("{}/api/Lawsuits", server.url()))
}

#[rstest]
#[case::too_many_requests(429)]
#[case::internal_error(500)]
#[case::bad_gateway(502)]
#[case::unavailable(503)]
#[case::gateway_timeout(504)]
#[tokio::test(flavor = "multi_thread")]
async fn persistent_transient_status_stops_after_five_attempts(
    clock: Arc<ManualClock>,
    #[case] status: usize,
) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let resource = server
        .mock("GET", "/api/Lawsuits")
        .with_status(status)
        .with_body("maintenance")
        .expect(5)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);

    let result = executor.execute(&lawsuits_request(&server)).await;

    assert_eq!(
        result,
        Err(RemoteError::Transient {
            status: u16::try_from(status).ok(),
            attempts: 5,
            message: "maintenance".to_owned(),
        })
    );
    resource.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refused_connections_are_retried_until_the_budget_is_spent(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server, 1).await;
    let closed = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("ephemeral port should be available");
    let executor = executor(&config_for(&server), clock);

    let result = executor
        .execute(&RemoteRequest::get(format!("http://{closed}/api/Lawsuits")))
        .await;

    assert!(
        matches!(
            result,
            Err(RemoteError::Transient {
                status: None,
                attempts: 5,
                ..
            })
        ),
        "unexpected result: {result:?}"
    );
    token.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transient_failure_then_success_returns_the_response(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let unavailable = server
        .mock("GET", "/api/Lawsuits")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let available = server
        .mock("GET", "/api/Lawsuits")
        .with_status(200)
        .with_body(r#"{"value":[{"id":7}]}"#)
        .expect(1)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);

    let response = executor
        .execute(&lawsuits_request(&server))
        .await
        .expect("second attempt should succeed");

    let body: Value = response.json().expect("body should be JSON");
    assert_eq!(body, json!({"value": [{"id": 7}]}));
    unavailable.assert_async().await;
    available.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_response_refreshes_the_token_once(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    let tokens = token_mock(&mut server, 2).await;
    let rejected = server
        .mock("GET", "/api/Lawsuits")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/api/Lawsuits")
        .match_header("authorization", "Bearer token-abc")
        .with_status(200)
        .with_body(r#"{"value":[]}"#)
        .expect(1)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);

    let response = executor
        .execute(&lawsuits_request(&server))
        .await
        .expect("resend after refresh should succeed");

    assert_eq!(response.status(), 200);
    tokens.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_unauthorized_response_is_permanent(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 2).await;
    let resource = server
        .mock("GET", "/api/Lawsuits")
        .with_status(401)
        .with_body("denied")
        .expect(2)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);

    let result = executor.execute(&lawsuits_request(&server)).await;

    assert_eq!(
        result,
        Err(RemoteError::Permanent {
            status: 401,
            body: "denied".to_owned(),
        })
    );
    resource.assert_async().await;
}

#[rstest]
#[case(400)]
#[case(404)]
#[case(422)]
#[tokio::test(flavor = "multi_thread")]
async fn client_errors_are_not_retried(clock: Arc<ManualClock>, #[case] status: usize) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let resource = server
        .mock("GET", "/api/Lawsuits")
        .with_status(status)
        .expect(1)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);

    let result = executor.execute(&lawsuits_request(&server)).await;

    assert!(
        matches!(result, Err(RemoteError::Permanent { status: got, .. }) if usize::from(got) == status),
        "expected permanent error, got {result:?}"
    );
    resource.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn post_bodies_and_query_parameters_are_sent(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let resource = server
        .mock("POST", "/api/Tasks")
        .match_query(mockito::Matcher::UrlEncoded("trace".to_owned(), "on".to_owned()))
        .match_body(mockito::Matcher::Json(json!({"description": "x"})))
        .with_status(201)
        .with_body(r#"{"id":1}"#)
        .expect(1)
        .create_async()
        .await;
    let executor = executor(&config_for(&server), clock);
    let request = RemoteRequest::post(
        format!("{}/api/Tasks", server.url()),
        json!({"description": "x"}),
    )
    .with_param("trace", "on");

    let response = executor.execute(&request).await.expect("post should succeed");

    assert_eq!(response.status(), 201);
    resource.assert_async().await;
}
