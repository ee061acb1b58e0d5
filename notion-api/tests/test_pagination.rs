//! Cursor pagination and streaming over database query results.

mod common;

use common::{DATABASE_ID, TestContext, TestResult, page_list_json};
use futures::StreamExt;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

const IDS: [&str; 5] = [
    "00000000000000000000000000000001",
    "00000000000000000000000000000002",
    "00000000000000000000000000000003",
    "00000000000000000000000000000004",
    "00000000000000000000000000000005",
];

/// three pages: [1,2] -> cursor c1 -> [3,4] -> cursor c2 -> [5]
async fn mount_three_pages(ctx: &TestContext) {
    let query_path = format!("/v1/databases/{DATABASE_ID}/query");
    Mock::given(method("POST"))
        .and(path(query_path.as_str()))
        .and(body_partial_json(json!({"start_cursor": "c1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_list_json(&IDS[2..4], Some("c2"))),
        )
        .with_priority(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path.as_str()))
        .and(body_partial_json(json!({"start_cursor": "c2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_list_json(&IDS[4..], None)))
        .with_priority(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_list_json(&IDS[..2], Some("c1"))),
        )
        .mount(&ctx.server)
        .await;
}

#[test_log::test(tokio::test)]
async fn test_first_page_only_from_list() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    mount_three_pages(&ctx).await;

    let first = ctx.client.query_database(DATABASE_ID).page_size(2).list().await?;
    assert_eq!(first.len(), 2);
    assert!(first.has_more);
    assert_eq!(first.next_cursor.as_deref(), Some("c1"));
    assert_eq!(ctx.server.received_requests().await.map(|r| r.len()), Some(1));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_collect_all_follows_next_cursor() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    mount_three_pages(&ctx).await;

    let pages = ctx
        .client
        .query_database(DATABASE_ID)
        .page_size(2)
        .list()
        .await?
        .collect_all()
        .await?;
    let ids = pages.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, IDS);

    let requests = ctx.server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
    let last: serde_json::Value = serde_json::from_slice(&requests[2].body)?;
    assert_eq!(last, json!({"page_size": 2, "start_cursor": "c2"}));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_stream_matches_collect_all() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    mount_three_pages(&ctx).await;

    let mut stream = ctx
        .client
        .query_database(DATABASE_ID)
        .list()
        .await?
        .into_stream();
    let mut streamed = Vec::new();
    while let Some(page) = stream.next().await {
        streamed.push(page?.id);
    }
    assert_eq!(streamed, IDS);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_stream_stops_after_error() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    let query_path = format!("/v1/databases/{DATABASE_ID}/query");
    Mock::given(method("POST"))
        .and(path(query_path.as_str()))
        .and(body_partial_json(json!({"start_cursor": "c1"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "object": "error", "status": 400, "code": "validation_error",
            "message": "start_cursor provided is invalid"
        })))
        .with_priority(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(query_path.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_list_json(&IDS[..2], Some("c1"))),
        )
        .mount(&ctx.server)
        .await;

    let results = ctx
        .client
        .query_database(DATABASE_ID)
        .list()
        .await?
        .into_stream()
        .collect::<Vec<_>>()
        .await;
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok() && results[1].is_ok());
    let err = results[2].as_ref().err().map(|e| e.api_code().cloned());
    assert_eq!(
        err,
        Some(Some(notion_api::error::ApiErrorCode::ValidationError))
    );
    Ok(())
}
