//! Filters and sorting for database queries
//!
//! A filter is either a property condition,
//! `{"property": "Status", "select": {"equals": "done"}}`,
//! or a compound of other filters, `{"and": [..]}` / `{"or": [..]}`.
//!
//! Prefer the `Filter` constructors such as [`Filter::select_equals`] and
//! [`Filter::text_contains`] over building conditions by hand. They only
//! produce combinations of property type and operator that the API accepts.
//!
//! ```rust
//! use notion_api::prelude::*;
//! // open tasks with "bug" in the title, or anything overdue
//! let filter = Filter::or(vec![
//!     Filter::and(vec![
//!         Filter::select_equals("Status", "open"),
//!         Filter::title_contains("Name", "bug"),
//!     ]),
//!     Filter::date_before("Due", "2025-01-01"),
//! ]);
//! ```

use serde::Serialize;
use serde_json::Number;
use snafu::prelude::*;

use crate::{Result, prelude::*};

/// Maximum depth of nested compound filters accepted by the API
const MAX_FILTER_NESTING: usize = 2;

/// Sort direction for query results
#[derive(Debug, Default, Serialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort on a property, or on a page timestamp
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Sort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// "created_time" or "last_edited_time"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub direction: SortDirection,
}

impl Sort {
    /// Constructs an ascending sort on a property.
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            timestamp: None,
            direction: SortDirection::Ascending,
        }
    }

    /// Constructs a descending sort on a property.
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            timestamp: None,
            direction: SortDirection::Descending,
        }
    }

    /// Sort by page creation time.
    pub fn created_time(direction: SortDirection) -> Self {
        Self {
            property: None,
            timestamp: Some("created_time".to_string()),
            direction,
        }
    }
}

/// Condition on title, rich_text, url, email, and phone_number properties.
/// `IsEmpty` and `IsNotEmpty` always carry `true`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextCondition {
    Equals(String),
    DoesNotEqual(String),
    Contains(String),
    DoesNotContain(String),
    StartsWith(String),
    EndsWith(String),
    IsEmpty(bool),
    IsNotEmpty(bool),
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NumberCondition {
    Equals(Number),
    DoesNotEqual(Number),
    GreaterThan(Number),
    LessThan(Number),
    GreaterThanOrEqualTo(Number),
    LessThanOrEqualTo(Number),
    IsEmpty(bool),
    IsNotEmpty(bool),
}

/// Condition on select and status (equals) or multi_select (contains) properties
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectCondition {
    Equals(String),
    DoesNotEqual(String),
    Contains(String),
    DoesNotContain(String),
    IsEmpty(bool),
    IsNotEmpty(bool),
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxCondition {
    Equals(bool),
    DoesNotEqual(bool),
}

/// Condition on date properties. Values are ISO-8601 dates or date-times.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateCondition {
    Equals(String),
    Before(String),
    After(String),
    OnOrBefore(String),
    OnOrAfter(String),
    IsEmpty(bool),
    IsNotEmpty(bool),
}

/// Condition keyed by the property type it applies to
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCondition {
    Title(TextCondition),
    RichText(TextCondition),
    Url(TextCondition),
    Email(TextCondition),
    PhoneNumber(TextCondition),
    Number(NumberCondition),
    Checkbox(CheckboxCondition),
    Select(SelectCondition),
    MultiSelect(SelectCondition),
    Status(SelectCondition),
    Date(DateCondition),
}

/// Database query filter
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Filter {
    /// Condition on one property, referenced by name or id
    Property {
        property: String,
        #[serde(flatten)]
        condition: PropertyCondition,
    },
    And {
        and: Vec<Filter>,
    },
    Or {
        or: Vec<Filter>,
    },
}

impl Filter {
    pub fn property(property: impl Into<String>, condition: PropertyCondition) -> Self {
        Self::Property {
            property: property.into(),
            condition,
        }
    }

    /// All filters must match
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { and: filters }
    }

    /// Any filter may match
    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or { or: filters }
    }

    pub fn select_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::Select(SelectCondition::Equals(value.into())),
        )
    }

    pub fn select_does_not_equal(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::Select(SelectCondition::DoesNotEqual(value.into())),
        )
    }

    pub fn multi_select_contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::MultiSelect(SelectCondition::Contains(value.into())),
        )
    }

    /// rich_text property contains the text (case-insensitive on the server)
    pub fn text_contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::RichText(TextCondition::Contains(value.into())),
        )
    }

    pub fn text_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::RichText(TextCondition::Equals(value.into())),
        )
    }

    pub fn text_starts_with(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::RichText(TextCondition::StartsWith(value.into())),
        )
    }

    pub fn title_contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::Title(TextCondition::Contains(value.into())),
        )
    }

    pub fn number_equals(property: impl Into<String>, value: impl Into<Number>) -> Self {
        Self::property(
            property,
            PropertyCondition::Number(NumberCondition::Equals(value.into())),
        )
    }

    pub fn number_greater_than(property: impl Into<String>, value: impl Into<Number>) -> Self {
        Self::property(
            property,
            PropertyCondition::Number(NumberCondition::GreaterThan(value.into())),
        )
    }

    pub fn number_less_than(property: impl Into<String>, value: impl Into<Number>) -> Self {
        Self::property(
            property,
            PropertyCondition::Number(NumberCondition::LessThan(value.into())),
        )
    }

    pub fn checkbox_equals(property: impl Into<String>, checked: bool) -> Self {
        Self::property(
            property,
            PropertyCondition::Checkbox(CheckboxCondition::Equals(checked)),
        )
    }

    pub fn date_after(property: impl Into<String>, date: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::Date(DateCondition::After(date.into())),
        )
    }

    pub fn date_before(property: impl Into<String>, date: impl Into<String>) -> Self {
        Self::property(
            property,
            PropertyCondition::Date(DateCondition::Before(date.into())),
        )
    }

    /// Property has no value. The condition is keyed by the property type,
    /// so the type must be one that supports `is_empty`; returns None otherwise.
    pub fn is_empty(property: impl Into<String>, kind: &PropertyType) -> Option<Self> {
        let condition = match kind {
            PropertyType::Title => PropertyCondition::Title(TextCondition::IsEmpty(true)),
            PropertyType::RichText => PropertyCondition::RichText(TextCondition::IsEmpty(true)),
            PropertyType::Url => PropertyCondition::Url(TextCondition::IsEmpty(true)),
            PropertyType::Email => PropertyCondition::Email(TextCondition::IsEmpty(true)),
            PropertyType::PhoneNumber => {
                PropertyCondition::PhoneNumber(TextCondition::IsEmpty(true))
            }
            PropertyType::Number => PropertyCondition::Number(NumberCondition::IsEmpty(true)),
            PropertyType::Select => PropertyCondition::Select(SelectCondition::IsEmpty(true)),
            PropertyType::MultiSelect => {
                PropertyCondition::MultiSelect(SelectCondition::IsEmpty(true))
            }
            PropertyType::Status => PropertyCondition::Status(SelectCondition::IsEmpty(true)),
            PropertyType::Date => PropertyCondition::Date(DateCondition::IsEmpty(true)),
            _ => return None,
        };
        Some(Self::property(property, condition))
    }

    /// Checks property references are non-empty, compounds are non-empty,
    /// and compounds are nested no deeper than the API allows.
    pub(crate) fn validate(&self) -> Result<()> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<()> {
        match self {
            Self::Property { property, .. } => {
                ensure!(
                    !property.is_empty(),
                    ValidationSnafu {
                        message: "filter property cannot be empty",
                    }
                );
            }
            Self::And { and: filters } | Self::Or { or: filters } => {
                ensure!(
                    depth < MAX_FILTER_NESTING,
                    ValidationSnafu {
                        message: format!(
                            "compound filters may be nested at most {MAX_FILTER_NESTING} deep"
                        ),
                    }
                );
                ensure!(
                    !filters.is_empty(),
                    ValidationSnafu {
                        message: "compound filter has no conditions",
                    }
                );
                for filter in filters {
                    filter.validate_at(depth + 1)?;
                }
            }
        }
        Ok(())
    }
}
