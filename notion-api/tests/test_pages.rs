//! Page and page property tests against a mock server.

mod common;

use common::{DATABASE_ID, PAGE_ID, TestContext, TestResult, page_json, text_fragment};
use notion_api::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, body_partial_json, method, path, query_param},
};

#[test_log::test(tokio::test)]
async fn test_create_page_from_generated_record() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    let schema = Schema::from([(
        "cat".to_string(),
        DatabaseProperty::new("cat", PropertyType::Select)
            .with_options(vec![SelectOption::named("A"), SelectOption::named("B")]),
    )]);
    let record = generate_record_with(&schema, &mut StdRng::seed_from_u64(1));
    let PropertyValueInput::Select { select } = &record["cat"] else {
        panic!("expected select value");
    };
    let chosen = select.name.clone();

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(body_json(json!({
            "parent": {"type": "database_id", "database_id": DATABASE_ID},
            "properties": {"cat": {"type": "select", "select": {"name": chosen}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(PAGE_ID)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let page = ctx.client.new_page(DATABASE_ID).properties(record).create().await?;
    assert_eq!(page.id, PAGE_ID);
    assert!(page.is_full());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_update_page_archive() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    Mock::given(method("PATCH"))
        .and(path(format!("/v1/pages/{PAGE_ID}")))
        .and(body_json(json!({"archived": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(PAGE_ID)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.client.update_page(PAGE_ID).archived(true).update().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_page_property_single_item() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{PAGE_ID}/properties/%40Q%5BM")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "property_item",
            "id": "%40Q%5BM",
            "type": "select",
            "select": {"id": "c1", "name": "cat1", "color": "default"}
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let value = ctx.client.page_property(PAGE_ID, "%40Q%5BM").get().await?;
    assert_eq!(format_response(&value), "c1 cat1");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_page_property_collect_all_follows_cursor() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    let list = |text: &str, next_cursor: Option<&str>| {
        json!({
            "object": "list",
            "results": [{"object": "property_item", "id": "title", "type": "title",
                         "title": text_fragment(text)}],
            "next_cursor": next_cursor,
            "has_more": next_cursor.is_some(),
            "type": "property_item",
            "property_item": {"id": "title", "next_url": null, "type": "title", "title": {}}
        })
    };
    let property_path = format!("/v1/pages/{PAGE_ID}/properties/title");
    Mock::given(method("GET"))
        .and(path(property_path.as_str()))
        .and(query_param("start_cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list("kale", None)))
        .with_priority(1)
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(property_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(list("Tuscan", Some("c2"))))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let value = ctx.client.page_property(PAGE_ID, "title").collect_all().await?;
    let PropertyItemResponse::List(list) = &value else {
        panic!("expected list response");
    };
    assert_eq!(list.results.len(), 2);
    assert!(!list.has_more);
    assert_eq!(format_response(&value), "Tuscan, kale");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_page_property_unknown_type_fails() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    Mock::given(method("GET"))
        .and(path(format!("/v1/pages/{PAGE_ID}/properties/abc")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "property_item",
            "id": "abc",
            "type": "hologram",
            "hologram": {}
        })))
        .mount(&ctx.server)
        .await;

    let result = ctx.client.page_property(PAGE_ID, "abc").get().await;
    assert!(matches!(result, Err(NotionError::Deserialization { .. })));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_query_cursor_in_body() -> TestResult<()> {
    let ctx = TestContext::new().await?;
    Mock::given(method("POST"))
        .and(path(format!("/v1/databases/{DATABASE_ID}/query")))
        .and(body_partial_json(json!({"start_cursor": "next"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::page_list_json(&[PAGE_ID], None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/databases/{DATABASE_ID}/query")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::page_list_json(&[PAGE_ID], Some("next"))),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let pages = ctx
        .client
        .query_database(DATABASE_ID)
        .list()
        .await?
        .collect_all()
        .await?;
    assert_eq!(pages.len(), 2);
    Ok(())
}
