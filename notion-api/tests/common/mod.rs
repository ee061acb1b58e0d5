//! Shared test utilities for notion-api integration tests
//!
//! Each test starts its own mock server and a client pointed at it.
#![cfg(test)]
#![allow(dead_code)]

use notion_api::prelude::*;
use serde_json::{Value, json};
use wiremock::MockServer;

pub type TestResult<T> = anyhow::Result<T>;

pub const TEST_TOKEN: &str = "secret_test_token";
pub const DATABASE_ID: &str = "d9824bdc84454327be8b5b47500af6ce";
pub const PAGE_ID: &str = "598337872cf94fdf8782e53db20768a5";
pub const ROOT_PAGE_ID: &str = "668d797c76fa49349b05ad288df2d136";

pub struct TestContext {
    pub server: MockServer,
    pub client: NotionClient,
}

impl TestContext {
    pub async fn new() -> TestResult<Self> {
        Self::with_rate_limit_retries(2).await
    }

    pub async fn with_rate_limit_retries(retries: u32) -> TestResult<Self> {
        let server = MockServer::start().await;
        let config = ClientConfig::default()
            .base_url(server.uri())
            .token(SecretToken::new(TEST_TOKEN))
            .root_page_id(ROOT_PAGE_ID)
            .rate_limit_max_retries(retries);
        let client = NotionClient::with_config(config)?;
        Ok(TestContext { server, client })
    }
}

pub fn text_fragment(text: &str) -> Value {
    json!({
        "type": "text",
        "text": {"content": text, "link": null},
        "annotations": {"bold": false, "italic": false, "strikethrough": false,
                        "underline": false, "code": false, "color": "default"},
        "plain_text": text,
        "href": null
    })
}

pub fn database_json(id: &str, title: &str) -> Value {
    json!({
        "object": "database",
        "id": id,
        "created_time": "2022-03-01T19:05:00.000Z",
        "last_edited_time": "2022-07-06T20:25:00.000Z",
        "title": [text_fragment(title)],
        "description": [],
        "is_inline": false,
        "archived": false,
        "url": format!("https://www.notion.so/{id}"),
        "parent": {"type": "page_id", "page_id": ROOT_PAGE_ID},
        "properties": {
            "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
            "category": {
                "id": "%40Q%5BM", "name": "category", "type": "select",
                "select": {"options": [
                    {"id": "c1", "name": "cat1", "color": "default"},
                    {"id": "c2", "name": "cat2", "color": "green"}
                ]}
            },
            "notes": {"id": "n%3Dx", "name": "notes", "type": "rich_text", "rich_text": {}}
        }
    })
}

pub fn page_json(id: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2022-03-01T19:05:00.000Z",
        "last_edited_time": "2022-07-06T20:25:00.000Z",
        "parent": {"type": "database_id", "database_id": DATABASE_ID},
        "archived": false,
        "url": format!("https://www.notion.so/{id}"),
        "properties": {
            "Name": {"id": "title", "type": "title", "title": [text_fragment("Tuscan kale")]},
            "category": {"id": "%40Q%5BM", "type": "select",
                         "select": {"id": "c1", "name": "cat1", "color": "default"}}
        }
    })
}

pub fn page_list_json(ids: &[&str], next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": ids.iter().map(|id| page_json(id)).collect::<Vec<_>>(),
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some(),
        "type": "page_or_database",
        "page_or_database": {}
    })
}
