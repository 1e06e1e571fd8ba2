//! Paginated collection walking against a mock server.

use super::support::{config_for, executor, token_mock};
use crate::remote::adapters::http::{CatalogQuery, PaginatedCatalogLoader};
use crate::remote::domain::{AuthError, RemoteError};
use crate::test_support::ManualClock;
use mockito::{Matcher, Server, ServerGuard};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

#[fixture]
fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::midweek())
}

fn page(ids: std::ops::RangeInclusive<i64>) -> String {
    let records: Vec<Value> = ids.map(|id| json!({"id": id, "name": format!("user {id}")})).collect();
    json!({"@odata.count": 100, "value": records}).to_string()
}

async fn mock_skip_page(server: &mut ServerGuard, skip: &str, body: String) -> mockito::Mock {
    server
        .mock("GET", "/api/Users")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("$skip".to_owned(), skip.to_owned()),
            Matcher::UrlEncoded("$top".to_owned(), "30".to_owned()),
            Matcher::UrlEncoded("$count".to_owned(), "true".to_owned()),
        ]))
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

fn ids_of(records: &[Value]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_i64))
        .collect()
}

fn loader_for(server: &ServerGuard, clock: Arc<ManualClock>) -> PaginatedCatalogLoader<ManualClock> {
    let config = config_for(server);
    PaginatedCatalogLoader::new(executor(&config, clock), config.normalized_base_url())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn skip_pagination_collects_every_record_in_order(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let pages = vec![
        mock_skip_page(&mut server, "0", page(1..=30)).await,
        mock_skip_page(&mut server, "30", page(31..=60)).await,
        mock_skip_page(&mut server, "60", page(61..=90)).await,
        mock_skip_page(&mut server, "90", page(91..=100)).await,
    ];
    let loader = loader_for(&server, clock);

    let records = loader
        .load_all("/Users", &CatalogQuery::new().select("id,name").top(30))
        .await
        .expect("listing should load");

    assert_eq!(ids_of(&records), (1..=100).collect::<Vec<_>>());
    for mock in pages {
        mock.assert_async().await;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn next_link_is_followed_verbatim(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let next_link = format!("{}/api/Users/continuation?token=abc", server.url());
    let first_records: Vec<Value> = (1..=30).map(|id| json!({"id": id})).collect();
    server
        .mock("GET", "/api/Users")
        .match_query(Matcher::UrlEncoded("$skip".to_owned(), "0".to_owned()))
        .with_status(200)
        .with_body(json!({"value": first_records, "@odata.nextLink": next_link}).to_string())
        .expect(1)
        .create_async()
        .await;
    let continuation = server
        .mock("GET", "/api/Users/continuation")
        .match_query(Matcher::Exact("token=abc".to_owned()))
        .with_status(200)
        .with_body(json!({"items": [{"id": 31}, {"id": 32}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let loader = loader_for(&server, clock);

    let records = loader
        .load_all("/Users", &CatalogQuery::new().top(30))
        .await
        .expect("listing should load");

    assert_eq!(ids_of(&records), (1..=32).collect::<Vec<_>>());
    continuation.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_mid_walk_returns_the_partial_result(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    mock_skip_page(&mut server, "0", page(1..=30)).await;
    server
        .mock("GET", "/api/Users")
        .match_query(Matcher::UrlEncoded("$skip".to_owned(), "30".to_owned()))
        .with_status(400)
        .with_body("bad skip")
        .create_async()
        .await;
    let loader = loader_for(&server, clock);

    let records = loader
        .load_all("/Users", &CatalogQuery::new().top(30))
        .await
        .expect("listing should load");

    assert_eq!(ids_of(&records), (1..=30).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_first_page_yields_no_records(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    token_mock(&mut server, 1).await;
    let only_page = server
        .mock("GET", "/api/Users")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"value":[]}"#)
        .expect(1)
        .create_async()
        .await;
    let loader = loader_for(&server, clock);

    let records = loader
        .load_all("/Users", &CatalogQuery::new())
        .await
        .expect("listing should load");

    assert!(records.is_empty());
    only_page.assert_async().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_abort_the_walk(clock: Arc<ManualClock>) {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("invalid_client")
        .create_async()
        .await;
    let listing = server
        .mock("GET", "/api/Users")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let loader = loader_for(&server, clock);

    let result = loader.load_all("/Users", &CatalogQuery::new()).await;

    assert_eq!(
        result,
        Err(RemoteError::Auth(AuthError::Rejected {
            status: 401,
            body: "invalid_client".to_owned(),
        }))
    );
    listing.assert_async().await;
}
