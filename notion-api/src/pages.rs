//! # Pages
//!
//! Database rows are pages whose properties follow the database schema.
//!
//! ## Page methods on NotionClient
//!
//! - [new_page](NotionClient::new_page) - create a row in a database
//! - [page](NotionClient::page) - retrieve a page
//! - [update_page](NotionClient::update_page) - change property values or archive
//! - [page_property](NotionClient::page_property) - retrieve one property value
//!
//! ```rust,no_run
//! use notion_api::prelude::*;
//!
//! # async fn example(client: &NotionClient, db_id: &str) -> Result<(), NotionError> {
//! let page = client
//!     .new_page(db_id)
//!     .property("Name", PropertyValueInput::title("Tuscan kale"))
//!     .property("category", PropertyValueInput::select("cat1"))
//!     .create()
//!     .await?;
//!
//! let title = client.page_property(&page.id, "title").collect_all().await?;
//! println!("{}", format_response(&title));
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::debug;

use crate::{Result, client::NotionClient, http_client::HttpClient, prelude::*};

/// A page, or a row of a database
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    pub id: String,

    pub created_time: DateTime<Utc>,

    pub last_edited_time: DateTime<Utc>,

    #[serde(default)]
    pub created_by: Option<User>,

    #[serde(default)]
    pub parent: Option<Parent>,

    #[serde(default)]
    pub archived: bool,

    /// Absent on partial page objects
    #[serde(default)]
    pub url: Option<String>,

    /// property name -> value
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyRef>,
}

impl Page {
    /// Full page objects have a url; partial ones only an id.
    pub fn is_full(&self) -> bool {
        self.url.is_some()
    }
}

/// A property value embedded in a page object.
///
/// The embedded value may be truncated (e.g., long titles or relation lists),
/// so the property `id` is what matters: use it with
/// [`page_property`](NotionClient::page_property) to retrieve the full value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PropertyRef {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: PropertyType,

    /// The value, keyed by type name, as raw json
    #[serde(flatten)]
    pub value: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CreatePageBody<'a> {
    parent: Parent,
    properties: &'a Record,
}

#[derive(Debug, Serialize, Default)]
struct UpdatePageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    archived: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: Record,
}

fn validate_record(limits: &ValidationLimits, record: &Record, description: &str) -> Result<()> {
    limits.validate_num_properties(record.len(), description)?;
    for (name, value) in record {
        ensure!(
            !name.is_empty(),
            ValidationSnafu {
                message: format!("{description}: property name cannot be empty"),
            }
        );
        for text in value.texts() {
            limits.validate_rich_text(text, &format!("{description} {name}"))?;
        }
    }
    Ok(())
}

/// Request builder for retrieving a page.
#[derive(Debug)]
pub struct PageRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    page_id: String,
}

impl PageRequest {
    /// Retrieves the page with its (possibly truncated) property values.
    pub async fn get(self) -> Result<Page> {
        self.limits.validate_id(&self.page_id, "page_id")?;
        self.client
            .get_request(&format!("/v1/pages/{}", self.page_id), Vec::new())
            .await
    }
}

/// Request builder for creating a page in a database.
#[derive(Debug)]
pub struct NewPageRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    database_id: String,
    properties: Record,
}

impl NewPageRequest {
    /// Adds all values of a record, replacing values already set for the same names.
    pub fn properties(mut self, record: Record) -> Self {
        self.properties.extend(record);
        self
    }

    /// Sets one property value.
    pub fn property(mut self, name: impl Into<String>, value: PropertyValueInput) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Creates the page.
    pub async fn create(self) -> Result<Page> {
        self.limits.validate_id(&self.database_id, "database_id")?;
        validate_record(&self.limits, &self.properties, "new_page")?;
        let body = CreatePageBody {
            parent: Parent::database(&self.database_id),
            properties: &self.properties,
        };
        let page: Page = self.client.post_request("/v1/pages", &body).await?;
        debug!(id = %page.id, database = %self.database_id, "created page");
        Ok(page)
    }
}

/// Request builder for updating a page.
#[derive(Debug)]
pub struct UpdatePageRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    page_id: String,
    body: UpdatePageBody,
}

impl UpdatePageRequest {
    /// Archives (true) or restores (false) the page.
    pub fn archived(mut self, archived: bool) -> Self {
        self.body.archived = Some(archived);
        self
    }

    /// Sets one property value.
    pub fn property(mut self, name: impl Into<String>, value: PropertyValueInput) -> Self {
        self.body.properties.insert(name.into(), value);
        self
    }

    /// Applies the update, returning the updated page.
    pub async fn update(self) -> Result<Page> {
        self.limits.validate_id(&self.page_id, "page_id")?;
        ensure!(
            self.body.archived.is_some() || !self.body.properties.is_empty(),
            ValidationSnafu {
                message: "update_page: nothing to update",
            }
        );
        validate_record(&self.limits, &self.body.properties, "update_page")?;
        self.client
            .patch_request(&format!("/v1/pages/{}", self.page_id), &self.body)
            .await
    }
}

/// Request builder for retrieving a page property value.
#[derive(Debug)]
pub struct PagePropertyRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    page_id: String,
    property_id: String,
    page_size: Option<u32>,
}

impl PagePropertyRequest {
    /// Items per page, for list-valued properties (1..=100)
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    fn validate(&self) -> Result<()> {
        self.limits.validate_id(&self.page_id, "page_id")?;
        ensure!(
            !self.property_id.is_empty(),
            ValidationSnafu {
                message: "property_id cannot be empty",
            }
        );
        if let Some(page_size) = self.page_size {
            self.limits.validate_page_size(page_size, "page_property")?;
        }
        Ok(())
    }

    fn path(&self) -> String {
        format!(
            "/v1/pages/{}/properties/{}",
            self.page_id, self.property_id
        )
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<PropertyItemResponse> {
        let mut query = Vec::new();
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_string(), page_size.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("start_cursor".to_string(), cursor.to_string()));
        }
        self.client.get_request(&self.path(), query).await
    }

    /// Retrieves the property value. List-valued properties return the first page of items.
    pub async fn get(self) -> Result<PropertyItemResponse> {
        self.validate()?;
        self.fetch(None).await
    }

    /// Retrieves the property value, following `next_cursor` until all
    /// items of a list-valued property have been fetched.
    /// The returned list has `has_more == false`.
    pub async fn collect_all(self) -> Result<PropertyItemResponse> {
        self.validate()?;
        let mut list = match self.fetch(None).await? {
            PropertyItemResponse::List(list) => list,
            single => return Ok(single),
        };
        while list.has_more {
            let Some(cursor) = list.next_cursor.take() else {
                break;
            };
            match self.fetch(Some(&cursor)).await? {
                PropertyItemResponse::List(next) => {
                    list.results.extend(next.results);
                    list.has_more = next.has_more;
                    list.next_cursor = next.next_cursor;
                }
                PropertyItemResponse::PropertyItem(item) => {
                    return OtherSnafu {
                        message: format!(
                            "page_property {}: expected list page, got single item {item:?}",
                            self.property_id
                        ),
                    }
                    .fail();
                }
            }
        }
        list.has_more = false;
        list.next_cursor = None;
        Ok(PropertyItemResponse::List(list))
    }
}

// ============================================================================
// NOTIONCLIENT METHODS
// ============================================================================

impl NotionClient {
    /// Creates a request builder for retrieving a page.
    pub fn page(&self, page_id: impl Into<String>) -> PageRequest {
        PageRequest {
            client: self.client.clone(),
            limits: self.config.limits.clone(),
            page_id: page_id.into(),
        }
    }

    /// Creates a request builder for creating a page in a database.
    pub fn new_page(&self, database_id: impl Into<String>) -> NewPageRequest {
        NewPageRequest {
            client: self.client.clone(),
            limits: self.config.limits.clone(),
            database_id: database_id.into(),
            properties: Record::new(),
        }
    }

    /// Creates a request builder for updating a page.
    pub fn update_page(&self, page_id: impl Into<String>) -> UpdatePageRequest {
        UpdatePageRequest {
            client: self.client.clone(),
            limits: self.config.limits.clone(),
            page_id: page_id.into(),
            body: UpdatePageBody::default(),
        }
    }

    /// Creates a request builder for retrieving one property value of a page.
    /// `property_id` is the id from the database schema or page object
    /// (as returned, already url-encoded), or the property name.
    pub fn page_property(
        &self,
        page_id: impl Into<String>,
        property_id: impl Into<String>,
    ) -> PagePropertyRequest {
        PagePropertyRequest {
            client: self.client.clone(),
            limits: self.config.limits.clone(),
            page_id: page_id.into(),
            property_id: property_id.into(),
            page_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_deserialize() {
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "created_time": "2022-03-01T19:05:00.000Z",
            "last_edited_time": "2022-07-06T20:25:00.000Z",
            "created_by": {"object": "user", "id": "ee5f0f84-409a-440f-983a-a5315961c6e4"},
            "parent": {"type": "database_id", "database_id": "d9824bdc-8445-4327-be8b-5b47500af6ce"},
            "archived": false,
            "url": "https://www.notion.so/Tuscan-kale-598337872cf94fdf8782e53db20768a5",
            "properties": {
                "Price": {"id": "BJXS", "type": "number", "number": 2.5},
                "Name": {"id": "title", "type": "title", "title": []}
            }
        }))
        .unwrap();
        assert!(page.is_full());
        assert_eq!(page.properties["Price"].id, "BJXS");
        assert_eq!(page.properties["Price"].kind, PropertyType::Number);
        assert_eq!(page.properties["Price"].value["number"], json!(2.5));
        assert_eq!(
            page.parent,
            Some(Parent::database("d9824bdc-8445-4327-be8b-5b47500af6ce"))
        );
    }

    #[test]
    fn test_create_body() {
        let mut record = Record::new();
        record.insert("cat".into(), PropertyValueInput::select("A"));
        let body = CreatePageBody {
            parent: Parent::database("db"),
            properties: &record,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "parent": {"type": "database_id", "database_id": "db"},
                "properties": {"cat": {"type": "select", "select": {"name": "A"}}}
            })
        );
    }

    #[test]
    fn test_validate_record() {
        let limits = ValidationLimits::default();
        let mut record = Record::new();
        record.insert("Name".into(), PropertyValueInput::title("ok"));
        validate_record(&limits, &record, "test").unwrap();

        record.insert(
            "Notes".into(),
            PropertyValueInput::rich_text("x".repeat(limits.rich_text_max_len + 1)),
        );
        assert!(validate_record(&limits, &record, "test").is_err());
    }
}
