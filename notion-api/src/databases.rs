//! # Databases
//!
//! ## Database methods on NotionClient
//!
//! - [database](NotionClient::database) - retrieve a database and its schema
//! - [new_database](NotionClient::new_database) - create a database under a page
//! - [update_database](NotionClient::update_database) - change title, description, or columns
//! - [query_database](NotionClient::query_database) - list rows, with filters and sorts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notion_api::prelude::*;
//!
//! # async fn example(client: &NotionClient) -> Result<(), NotionError> {
//! let db = client
//!     .new_database("test-database")
//!     .description("non default test-database-description")
//!     .property("Name", PropertySchema::title())
//!     .property("category", PropertySchema::select(["cat1", "cat2"]))
//!     .create()
//!     .await?;
//!
//! let db = client
//!     .update_database(&db.id)
//!     .title("new title")
//!     .add_property("new property", PropertySchema::rich_text())
//!     .update()
//!     .await?;
//!
//! let rows = client
//!     .query_database(&db.id)
//!     .filter(Filter::select_equals("category", "cat1"))
//!     .list()
//!     .await?
//!     .collect_all()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::debug;

use crate::{
    Result,
    client::NotionClient,
    http_client::{HttpClient, QueryPaged},
    prelude::*,
};

/// A database: title, description, and schema
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Database {
    pub id: String,

    pub created_time: DateTime<Utc>,

    pub last_edited_time: DateTime<Utc>,

    #[serde(default)]
    pub title: Vec<RichText>,

    #[serde(default)]
    pub description: Vec<RichText>,

    /// Schema: property name -> definition
    #[serde(default)]
    pub properties: Schema,

    #[serde(default)]
    pub parent: Option<Parent>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub is_inline: bool,
}

impl Database {
    /// Title as plain text
    pub fn title_text(&self) -> String {
        plain_text(&self.title)
    }

    /// Description as plain text
    pub fn description_text(&self) -> String {
        plain_text(&self.description)
    }

    /// Looks up a property definition by name
    pub fn property(&self, name: &str) -> Option<&DatabaseProperty> {
        self.properties.get(name)
    }

    /// Looks up a property definition by its id
    pub fn property_by_id(&self, id: &str) -> Option<(&String, &DatabaseProperty)> {
        self.properties.iter().find(|(_, prop)| prop.id == id)
    }
}

// ============================================================================
// REQUEST BODY TYPES (internal)
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateDatabaseBody {
    parent: Parent,
    title: Vec<RichTextInput>,
    description: Vec<RichTextInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_inline: Option<bool>,
    properties: BTreeMap<String, PropertySchema>,
}

/// Change to one column. Serializes as `{"name": "new name"}` for a rename,
/// `{"rich_text": {}}` for a new or retyped column, or both.
#[derive(Debug, Clone, Serialize, PartialEq)]
struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(flatten)]
    schema: Option<PropertySchema>,
}

#[derive(Debug, Serialize, Default)]
struct UpdateDatabaseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<Vec<RichTextInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<Vec<RichTextInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived: Option<bool>,
    // None serializes as null, which removes the column
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Option<PropertyUpdate>>,
}

#[derive(Debug, Serialize, Default)]
struct QueryDatabaseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

// ============================================================================
// BUILDER STRUCTS (public)
// ============================================================================

/// Request builder for retrieving a database.
#[derive(Debug)]
pub struct DatabaseRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    database_id: String,
}

impl DatabaseRequest {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        limits: ValidationLimits,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            limits,
            database_id: database_id.into(),
        }
    }

    /// Retrieves the database, including its schema.
    pub async fn get(self) -> Result<Database> {
        self.limits.validate_id(&self.database_id, "database_id")?;
        self.client
            .get_request(&format!("/v1/databases/{}", self.database_id), Vec::new())
            .await
    }
}

/// Request builder for creating a database.
///
/// Defaults: parent is the client's `root_page_id`, description is empty, and
/// when no properties are given the schema is a single title column, "Name".
#[derive(Debug)]
pub struct NewDatabaseRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    parent_page_id: Option<String>,
    title: String,
    description: String,
    is_inline: Option<bool>,
    properties: BTreeMap<String, PropertySchema>,
}

impl NewDatabaseRequest {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        limits: ValidationLimits,
        parent_page_id: Option<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            client,
            limits,
            parent_page_id,
            title: title.into(),
            description: String::new(),
            is_inline: None,
            properties: BTreeMap::new(),
        }
    }

    /// Sets the parent page.
    pub fn parent_page(mut self, page_id: impl Into<String>) -> Self {
        self.parent_page_id = Some(page_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Displays the database inline in the parent page
    pub fn inline(mut self, is_inline: bool) -> Self {
        self.is_inline = Some(is_inline);
        self
    }

    /// Adds a column.
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Adds columns.
    pub fn properties(
        mut self,
        properties: impl IntoIterator<Item = (String, PropertySchema)>,
    ) -> Self {
        self.properties.extend(properties);
        self
    }

    fn into_body(self) -> Result<(Arc<HttpClient>, CreateDatabaseBody)> {
        let parent = self.parent_page_id.context(ConfigSnafu {
            message: "new_database: no parent page. Set NOTION_BASE_PAGE_ID or call parent_page()",
        })?;
        self.limits.validate_id(&parent, "parent page_id")?;
        self.limits.validate_rich_text(&self.title, "database title")?;
        self.limits
            .validate_rich_text(&self.description, "database description")?;
        self.limits
            .validate_num_properties(self.properties.len(), "new_database")?;

        let mut properties = self.properties;
        if properties.is_empty() {
            properties.insert("Name".to_string(), PropertySchema::title());
        }
        let titles = properties
            .values()
            .filter(|schema| matches!(schema, PropertySchema::Title {}))
            .count();
        ensure!(
            titles == 1,
            ValidationSnafu {
                message: format!("new_database: schema needs exactly one title property, found {titles}"),
            }
        );

        let description = if self.description.is_empty() {
            Vec::new()
        } else {
            RichTextInput::plain(self.description)
        };
        Ok((
            self.client,
            CreateDatabaseBody {
                parent: Parent::page(parent),
                title: RichTextInput::plain(self.title),
                description,
                is_inline: self.is_inline,
                properties,
            },
        ))
    }

    /// Creates the database.
    pub async fn create(self) -> Result<Database> {
        let (client, body) = self.into_body()?;
        let database: Database = client.post_request("/v1/databases", &body).await?;
        debug!(id = %database.id, title = %database.title_text(), "created database");
        Ok(database)
    }
}

/// Request builder for updating a database.
#[derive(Debug)]
pub struct UpdateDatabaseRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    database_id: String,
    body: UpdateDatabaseBody,
}

impl UpdateDatabaseRequest {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        limits: ValidationLimits,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            limits,
            database_id: database_id.into(),
            body: UpdateDatabaseBody::default(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.body.title = Some(RichTextInput::plain(title));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.body.description = Some(RichTextInput::plain(description));
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.body.archived = Some(archived);
        self
    }

    /// Adds a column, or changes the type of an existing column
    pub fn add_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.body.properties.insert(
            name.into(),
            Some(PropertyUpdate {
                name: None,
                schema: Some(schema),
            }),
        );
        self
    }

    /// Renames a column, identified by its current name or id
    pub fn rename_property(
        mut self,
        name_or_id: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        self.body.properties.insert(
            name_or_id.into(),
            Some(PropertyUpdate {
                name: Some(new_name.into()),
                schema: None,
            }),
        );
        self
    }

    /// Removes a column, identified by its name or id
    pub fn remove_property(mut self, name_or_id: impl Into<String>) -> Self {
        self.body.properties.insert(name_or_id.into(), None);
        self
    }

    fn validate(&self) -> Result<()> {
        self.limits.validate_id(&self.database_id, "database_id")?;
        let body = &self.body;
        ensure!(
            body.title.is_some()
                || body.description.is_some()
                || body.archived.is_some()
                || !body.properties.is_empty(),
            ValidationSnafu {
                message: "update_database: nothing to update",
            }
        );
        for text in body.title.iter().chain(body.description.iter()).flatten() {
            self.limits
                .validate_rich_text(text.content(), "update_database")?;
        }
        self.limits
            .validate_num_properties(body.properties.len(), "update_database")?;
        Ok(())
    }

    /// Applies the update, returning the updated database.
    pub async fn update(self) -> Result<Database> {
        self.validate()?;
        self.client
            .patch_request(&format!("/v1/databases/{}", self.database_id), &self.body)
            .await
    }
}

/// Request builder for querying the rows (pages) of a database.
#[derive(Debug)]
pub struct QueryDatabaseRequest {
    client: Arc<HttpClient>,
    limits: ValidationLimits,
    database_id: String,
    body: QueryDatabaseBody,
}

impl QueryDatabaseRequest {
    pub(crate) fn new(
        client: Arc<HttpClient>,
        limits: ValidationLimits,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            limits,
            database_id: database_id.into(),
            body: QueryDatabaseBody::default(),
        }
    }

    /// Sets the filter. A later call replaces an earlier one;
    /// combine conditions with `Filter::and` or `Filter::or`.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.body.filter = Some(filter);
        self
    }

    /// Adds a sort. Earlier sorts take precedence.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.body.sorts.push(sort);
        self
    }

    /// Number of rows per page (1..=100)
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.body.page_size = Some(page_size);
        self
    }

    /// Executes the query. The result holds the first page;
    /// use `into_stream()` or `collect_all()` for all rows.
    pub async fn list(self) -> Result<PagedResult<Page>> {
        self.limits.validate_id(&self.database_id, "database_id")?;
        if let Some(page_size) = self.body.page_size {
            self.limits.validate_page_size(page_size, "query_database")?;
        }
        if let Some(filter) = &self.body.filter {
            filter.validate()?;
        }
        self.client
            .post_request_paged(
                &format!("/v1/databases/{}/query", self.database_id),
                &self.body,
            )
            .await
    }
}

// ============================================================================
// NOTIONCLIENT METHODS
// ============================================================================

impl NotionClient {
    /// Creates a request builder for retrieving a database.
    pub fn database(&self, database_id: impl Into<String>) -> DatabaseRequest {
        DatabaseRequest::new(self.client.clone(), self.config.limits.clone(), database_id)
    }

    /// Creates a request builder for creating a database.
    pub fn new_database(&self, title: impl Into<String>) -> NewDatabaseRequest {
        NewDatabaseRequest::new(
            self.client.clone(),
            self.config.limits.clone(),
            self.config.root_page_id.clone(),
            title,
        )
    }

    /// Creates a request builder for updating a database.
    pub fn update_database(&self, database_id: impl Into<String>) -> UpdateDatabaseRequest {
        UpdateDatabaseRequest::new(self.client.clone(), self.config.limits.clone(), database_id)
    }

    /// Creates a request builder for querying a database.
    pub fn query_database(&self, database_id: impl Into<String>) -> QueryDatabaseRequest {
        QueryDatabaseRequest::new(self.client.clone(), self.config.limits.clone(), database_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const PAGE_ID: &str = "668d797c76fa49349b05ad288df2d136";

    fn test_client() -> NotionClient {
        let config = ClientConfig::default()
            .base_url("http://127.0.0.1:1")
            .token(SecretToken::new("secret_test"));
        NotionClient::with_config(ClientConfig {
            root_page_id: None,
            ..config
        })
        .unwrap()
    }

    #[test]
    fn test_new_database_defaults() {
        let (_, body) = test_client()
            .new_database("test-database")
            .parent_page(PAGE_ID)
            .into_body()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "parent": {"type": "page_id", "page_id": PAGE_ID},
                "title": [{"type": "text", "text": {"content": "test-database"}}],
                "description": [],
                "properties": {"Name": {"title": {}}}
            })
        );
    }

    #[test]
    fn test_new_database_requires_parent() {
        let err = test_client().new_database("x").into_body().unwrap_err();
        assert!(matches!(err, NotionError::Config { .. }));
    }

    #[test]
    fn test_new_database_requires_one_title() {
        let err = test_client()
            .new_database("x")
            .parent_page(PAGE_ID)
            .property("email", PropertySchema::Email {})
            .into_body()
            .unwrap_err();
        assert!(matches!(err, NotionError::Validation { .. }));
    }

    #[test]
    fn test_update_body() {
        let req = test_client()
            .update_database(PAGE_ID)
            .title("new title")
            .description("updated description")
            .add_property("new property", PropertySchema::rich_text())
            .rename_property("amount", "amount in USD")
            .remove_property("twitter");
        req.validate().unwrap();
        assert_eq!(
            serde_json::to_value(&req.body).unwrap(),
            json!({
                "title": [{"type": "text", "text": {"content": "new title"}}],
                "description": [{"type": "text", "text": {"content": "updated description"}}],
                "properties": {
                    "amount": {"name": "amount in USD"},
                    "new property": {"rich_text": {}},
                    "twitter": null
                }
            })
        );
    }

    #[test]
    fn test_update_nothing_is_invalid() {
        let req = test_client().update_database(PAGE_ID);
        assert!(matches!(
            req.validate(),
            Err(NotionError::Validation { .. })
        ));
    }

    #[test]
    fn test_query_body() {
        let req = test_client()
            .query_database(PAGE_ID)
            .filter(Filter::select_equals("cat", "A"))
            .sort(Sort::ascending("amount"))
            .page_size(10);
        assert_eq!(
            serde_json::to_value(&req.body).unwrap(),
            json!({
                "filter": {"property": "cat", "select": {"equals": "A"}},
                "sorts": [{"property": "amount", "direction": "ascending"}],
                "page_size": 10
            })
        );
        let empty = test_client().query_database(PAGE_ID);
        assert_eq!(serde_json::to_value(&empty.body).unwrap(), json!({}));
    }

    #[test]
    fn test_database_deserialize() {
        let db: Database = serde_json::from_value(json!({
            "object": "database",
            "id": "bc1211ca-e3f1-4939-ae34-5260b16f627c",
            "created_time": "2021-07-08T23:50:00.000Z",
            "last_edited_time": "2021-07-08T23:50:00.000Z",
            "title": [{"type": "text", "text": {"content": "Grocery List", "link": null},
                       "plain_text": "Grocery List", "href": null}],
            "description": [],
            "properties": {
                "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
                "Price": {"id": "evWq", "name": "Price", "type": "number",
                          "number": {"format": "dollar"}}
            },
            "parent": {"type": "page_id", "page_id": "98ad959b-2b6a-4774-80ee-00246fb0ea9b"},
            "url": "https://www.notion.so/bc1211cae3f14939ae34260b16f627c",
            "archived": false,
            "is_inline": false
        }))
        .unwrap();
        assert_eq!(db.title_text(), "Grocery List");
        assert_eq!(db.description_text(), "");
        assert_eq!(db.property("Price").map(|p| &p.kind), Some(&PropertyType::Number));
        assert_eq!(db.property_by_id("title").map(|(name, _)| name.as_str()), Some("Name"));
    }
}
