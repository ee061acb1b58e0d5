/*
 * notion-api rust client
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Notion Rust API Client
//!
//! A typed client for the Notion REST API, plus two pure helpers that work on
//! the API's data model:
//!
//! - [`generate`] builds a record of random, schema-consistent property values
//!   for a database, suitable for `pages.create`.
//! - [`format`] renders any page property value returned by the API as a
//!   human-readable string.
//!
//! ## Features
//!
//! - supports Notion API version 2022-06-28
//! - databases: retrieve, create, update, query (with filters and sorts)
//! - pages: create, retrieve, update, retrieve property items
//! - cursor pagination with async Streams
//! - http middleware with retry logic and rate limit handling
//! - parameter validation
//! - metrics
//! - companion cli tool (`notr`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notion_api::prelude::*;
//! # async fn example() -> Result<(), NotionError> {
//!
//! // token is read from NOTION_TOKEN
//! let client = NotionClient::new()?;
//!
//! // fetch a database schema and create a page with random values
//! let db = client.database("0123456789abcdef0123456789abcdef").get().await?;
//! let record = generate_record(&db.properties);
//! let page = client.new_page(&db.id).properties(record).create().await?;
//!
//! // read each property back, formatted for display
//! for (name, prop) in &page.properties {
//!     let value = client.page_property(&page.id, &prop.id).get().await?;
//!     println!("{name}: {}", format_response(&value));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API Structure
//!
//! Methods on `NotionClient` return request builders that are configured with
//! chained method calls and then executed with a terminal method like `get()`,
//! `create()`, `update()`, or `list()`.
//!
//! ```rust,no_run
//! use notion_api::prelude::*;
//! # async fn example(client: &NotionClient) -> Result<(), NotionError> {
//! let db = client
//!     .new_database("Projects")
//!     .description("tracked work")
//!     .property("Name", PropertySchema::title())
//!     .property("Status", PropertySchema::select(["todo", "done"]))
//!     .create()
//!     .await?;
//!
//! let open = client
//!     .query_database(&db.id)
//!     .filter(Filter::select_equals("Status", "todo"))
//!     .sort(Sort::descending("Name"))
//!     .list()
//!     .await?
//!     .collect_all()
//!     .await?;
//! println!("{} open", open.len());
//! # Ok(())
//! # }
//! ```
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::missing_const_for_fn)] //  nursery function
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::future_not_send)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

pub mod client;
pub mod databases;
pub mod error;
pub mod filters;
pub mod format;
pub mod generate;
mod http_client;
pub mod paged;
pub mod pages;
pub mod rich_text;
pub mod schema;
pub mod validation;
pub mod values;

/// Result type alias using `NotionError` as the default error.
pub type Result<T, E = crate::error::NotionError> = std::result::Result<T, E>;

/// Prelude module - import (nearly) all the things with `use notion_api::prelude::*;`
pub mod prelude {
    pub use super::{NOTION_API_URL, NOTION_API_VERSION};
    pub use crate::error::*;
    pub use crate::{
        client::{ClientConfig, NotionClient, SecretToken},
        databases::Database,
        filters::{
            DateCondition, Filter, NumberCondition, SelectCondition, Sort, SortDirection,
            TextCondition,
        },
        format::{format_json, format_property_item, format_response},
        generate::{Record, generate_record, generate_record_with, random_select_value},
        http_client::HttpMetricsSnapshot,
        paged::{PagedResult, PaginatedResponse},
        pages::{Page, PropertyRef},
        rich_text::{RichText, RichTextContent, RichTextInput, plain_text},
        schema::{
            Color, DatabaseProperty, NumberFormat, PropertySchema, PropertyType, Schema,
            SelectOption,
        },
        validation::ValidationLimits,
        values::{
            DateInput, DateValue, FileRef, FormulaValue, Parent, PropertyItem,
            PropertyItemList, PropertyItemResponse, PropertyValueInput, RelationRef,
            RollupValue, User,
        },
    };
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// API version sent in the `Notion-Version` header
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Public API endpoint
pub const NOTION_API_URL: &str = "https://api.notion.com";

pub(crate) mod config {
    /// Environment variable for endpoint URL override
    pub const NOTION_URL_ENV: &str = "NOTION_URL";

    /// Environment variable holding the integration token
    pub const NOTION_TOKEN_ENV: &str = "NOTION_TOKEN";

    /// Environment variable holding the default parent page for new databases
    pub const NOTION_ROOT_PAGE_ENV: &str = "NOTION_BASE_PAGE_ID";

    /// API version header
    pub const NOTION_VERSION_HEADER: &str = "Notion-Version";

    /// Warn when the rate-limit wait exceeds this duration (seconds).
    pub const RATE_LIMIT_WAIT_WARN_SECS: u64 = 5;

    /// Fail when the rate-limit wait exceeds this duration (seconds).
    pub const RATE_LIMIT_WAIT_MAX_SECS: u64 = 60;

    /// Environment variable to override rate-limit retry cap (0 disables the cap).
    pub const RATE_LIMIT_MAX_RETRIES_ENV: &str = "NOTION_RATE_LIMIT_MAX_RETRIES";

    /// Maximum consecutive 429 retries before failing.
    pub const RATE_LIMIT_MAX_RETRIES_DEFAULT: u32 = 5;

    /// Maximum page size accepted by list endpoints
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Max retries for connection failures and timeouts
    pub const MAX_RETRIES: u32 = 3;

    // Validation limits
    pub const VALIDATION_RICH_TEXT_MAX_LEN: usize = 2000;
    pub const VALIDATION_BODY_MAX_LEN: usize = 500 * 1024;
    pub const VALIDATION_MAX_PROPERTIES: usize = 100;
    pub const VALIDATION_MAX_QUERY_LEN: usize = 4000;
}
