//! Property values
//!
//! Page property values travel in two directions:
//!
//! - [`PropertyValueInput`] is written in create and update page requests
//!   (a record is a map of property name -> input value).
//! - [`PropertyItem`] is read back from the page property endpoint,
//!   enveloped in a [`PropertyItemResponse`] that is either a single item or
//!   a paginated list of items (title, rich_text, people, relation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    rich_text::{RichText, RichTextInput},
    schema::SelectOption,
};

/// Parent of a page or database
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    PageId { page_id: String },
    DatabaseId { database_id: String },
    BlockId { block_id: String },
    Workspace { workspace: bool },
}

impl Parent {
    pub fn page(page_id: impl Into<String>) -> Self {
        Parent::PageId {
            page_id: page_id.into(),
        }
    }

    pub fn database(database_id: impl Into<String>) -> Self {
        Parent::DatabaseId {
            database_id: database_id.into(),
        }
    }
}

/// A user, as referenced by people, created_by, and last_edited_by values.
/// Partial user objects carry only the id.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// "person" or "bot"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DateValue {
    /// ISO-8601 date or date-time
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// A file attached to a files property
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileRef {
    pub name: String,
    /// "file" (hosted) or "external"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RelationRef {
    pub id: String,
}

/// Computed value of a formula property
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateValue> },
}

/// Computed value of a rollup property
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollupValue {
    Number {
        number: Option<f64>,
    },
    Date {
        date: Option<DateValue>,
    },
    Array {
        #[serde(default)]
        array: Vec<serde_json::Value>,
    },
    Incomplete {
        #[serde(default)]
        incomplete: Option<serde_json::Value>,
    },
    Unsupported {
        #[serde(default)]
        unsupported: Option<serde_json::Value>,
    },
}

/// Value of one page property, as returned by
/// `GET /v1/pages/{page_id}/properties/{property_id}`.
///
/// Title, rich_text, people, and relation values are paginated, so each item
/// holds a single element and the full value is the list of items.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyItem {
    Checkbox { checkbox: bool },
    CreatedBy { created_by: User },
    CreatedTime { created_time: DateTime<Utc> },
    Date { date: Option<DateValue> },
    Email { email: Option<String> },
    Url { url: Option<String> },
    Number { number: Option<f64> },
    PhoneNumber { phone_number: Option<String> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Option<Vec<SelectOption>> },
    People { people: User },
    LastEditedBy { last_edited_by: User },
    LastEditedTime { last_edited_time: DateTime<Utc> },
    Title { title: RichText },
    RichText { rich_text: RichText },
    Files { files: Vec<FileRef> },
    Formula { formula: FormulaValue },
    Rollup { rollup: RollupValue },
    Relation { relation: Option<RelationRef> },
    Status { status: Option<SelectOption> },
}

/// Describes the property of a paginated list response
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ListPropertyInfo {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub next_url: Option<String>,
}

/// Paginated list of property items
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PropertyItemList {
    #[serde(default)]
    pub results: Vec<PropertyItem>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub property_item: Option<ListPropertyInfo>,
}

/// Response of the page property endpoint, tagged by `object`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum PropertyItemResponse {
    PropertyItem(PropertyItem),
    List(PropertyItemList),
}

/// Date in create and update page requests
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DateInput {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Property value in create and update page requests
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValueInput {
    Title { title: Vec<RichTextInput> },
    RichText { rich_text: Vec<RichTextInput> },
    Number { number: serde_json::Number },
    Select { select: SelectOption },
    MultiSelect { multi_select: Vec<SelectOption> },
    Status { status: SelectOption },
    Date { date: DateInput },
    Checkbox { checkbox: bool },
    Url { url: String },
    Email { email: String },
    PhoneNumber { phone_number: String },
    Relation { relation: Vec<RelationRef> },
}

impl PropertyValueInput {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title {
            title: RichTextInput::plain(text),
        }
    }

    pub fn rich_text(text: impl Into<String>) -> Self {
        Self::RichText {
            rich_text: RichTextInput::plain(text),
        }
    }

    pub fn select(name: impl Into<String>) -> Self {
        Self::Select {
            select: SelectOption::named(name),
        }
    }

    /// Type name of the value, e.g., "rich_text"
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Title { .. } => "title",
            Self::RichText { .. } => "rich_text",
            Self::Number { .. } => "number",
            Self::Select { .. } => "select",
            Self::MultiSelect { .. } => "multi_select",
            Self::Status { .. } => "status",
            Self::Date { .. } => "date",
            Self::Checkbox { .. } => "checkbox",
            Self::Url { .. } => "url",
            Self::Email { .. } => "email",
            Self::PhoneNumber { .. } => "phone_number",
            Self::Relation { .. } => "relation",
        }
    }

    /// Text fragments in the value, for length checks
    pub(crate) fn texts(&self) -> Vec<&str> {
        match self {
            Self::Title { title: parts } | Self::RichText { rich_text: parts } => {
                parts.iter().map(RichTextInput::content).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_single_item() {
        let resp: PropertyItemResponse = serde_json::from_value(json!({
            "object": "property_item",
            "id": "kjPO",
            "type": "number",
            "number": 2
        }))
        .unwrap();
        assert_eq!(
            resp,
            PropertyItemResponse::PropertyItem(PropertyItem::Number { number: Some(2.0) })
        );
    }

    #[test]
    fn test_deserialize_null_values() {
        let item: PropertyItem =
            serde_json::from_value(json!({"type": "email", "email": null})).unwrap();
        assert_eq!(item, PropertyItem::Email { email: None });

        let item: PropertyItem =
            serde_json::from_value(json!({"type": "select", "select": null})).unwrap();
        assert_eq!(item, PropertyItem::Select { select: None });
    }

    #[test]
    fn test_deserialize_list() {
        let resp: PropertyItemResponse = serde_json::from_value(json!({
            "object": "list",
            "results": [{
                "object": "property_item",
                "id": "title",
                "type": "title",
                "title": {
                    "type": "text",
                    "text": {"content": "Tuscan kale", "link": null},
                    "annotations": {"bold": false, "italic": false, "strikethrough": false,
                                    "underline": false, "code": false, "color": "default"},
                    "plain_text": "Tuscan kale",
                    "href": null
                }
            }],
            "next_cursor": null,
            "has_more": false,
            "type": "property_item",
            "property_item": {"id": "title", "next_url": null, "type": "title", "title": {}}
        }))
        .unwrap();
        let PropertyItemResponse::List(list) = resp else {
            panic!("expected list");
        };
        assert_eq!(list.results.len(), 1);
        assert_eq!(
            list.property_item.map(|p| p.kind),
            Some("title".to_string())
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let err =
            serde_json::from_value::<PropertyItem>(json!({"type": "hologram", "hologram": 1}));
        assert!(err.is_err());
        let err = serde_json::from_value::<PropertyItemResponse>(json!({"object": "block"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_formula_and_rollup() {
        let item: PropertyItem = serde_json::from_value(json!({
            "type": "formula",
            "formula": {"type": "boolean", "boolean": true}
        }))
        .unwrap();
        assert_eq!(
            item,
            PropertyItem::Formula {
                formula: FormulaValue::Boolean {
                    boolean: Some(true)
                }
            }
        );

        let item: PropertyItem = serde_json::from_value(json!({
            "type": "rollup",
            "rollup": {"type": "incomplete", "incomplete": {}, "function": "show_original"}
        }))
        .unwrap();
        assert!(matches!(
            item,
            PropertyItem::Rollup {
                rollup: RollupValue::Incomplete { .. }
            }
        ));
    }

    #[test]
    fn test_input_serialization() {
        let value = serde_json::to_value(PropertyValueInput::select("A")).unwrap();
        assert_eq!(value, json!({"type": "select", "select": {"name": "A"}}));

        let value = serde_json::to_value(PropertyValueInput::Number {
            number: 42.into(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "number", "number": 42}));

        let value = serde_json::to_value(PropertyValueInput::title("hello world")).unwrap();
        assert_eq!(
            value,
            json!({"type": "title", "title": [{"type": "text", "text": {"content": "hello world"}}]})
        );
    }

    #[test]
    fn test_parent_serialization() {
        assert_eq!(
            serde_json::to_value(Parent::page("abc")).unwrap(),
            json!({"type": "page_id", "page_id": "abc"})
        );
        let parent: Parent =
            serde_json::from_value(json!({"type": "workspace", "workspace": true})).unwrap();
        assert_eq!(parent, Parent::Workspace { workspace: true });
    }
}
