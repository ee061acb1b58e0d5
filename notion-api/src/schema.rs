//! Database schema
//!
//! A database's schema maps each property (column) name to its definition.
//! Definitions arrive from the API as [`DatabaseProperty`]; new columns are
//! described for create/update requests with [`PropertySchema`].
//!
//! Property types this library doesn't model deserialize to
//! [`PropertyType::Unknown`] rather than failing, so a schema containing new
//! column types can still be fetched.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Database schema: property name -> definition
pub type Schema = BTreeMap<String, DatabaseProperty>;

/// Type of a database property
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PropertyType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    Relation,
    Rollup,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
    UniqueId,
    Button,
    Verification,
    /// A type name not known to this library
    #[strum(default)]
    Unknown(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Date => "date",
            Self::People => "people",
            Self::Files => "files",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Formula => "formula",
            Self::Relation => "relation",
            Self::Rollup => "rollup",
            Self::CreatedTime => "created_time",
            Self::CreatedBy => "created_by",
            Self::LastEditedTime => "last_edited_time",
            Self::LastEditedBy => "last_edited_by",
            Self::UniqueId => "unique_id",
            Self::Button => "button",
            Self::Verification => "verification",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PropertyType {
    fn from(name: String) -> Self {
        PropertyType::from_str(&name).unwrap_or(PropertyType::Unknown(name))
    }
}

impl From<PropertyType> for String {
    fn from(kind: PropertyType) -> Self {
        kind.as_str().to_string()
    }
}

impl Serialize for PropertyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(PropertyType::from)
    }
}

/// Color for select options and text annotations
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    /// background colors and any other color name
    #[serde(other)]
    Other,
}

/// An option of a select, multi-select, or status property
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl SelectOption {
    /// An option identified by name only
    pub fn named(name: impl Into<String>) -> Self {
        SelectOption {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

/// Display format of a number property
#[derive(
    Debug,
    Default,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NumberFormat {
    #[default]
    Number,
    NumberWithCommas,
    Percent,
    Dollar,
    Euro,
    Pound,
    Yen,
    Rupee,
    Won,
    Yuan,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SelectConfig {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NumberConfig {
    #[serde(default)]
    pub format: NumberFormat,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FormulaConfig {
    #[serde(default)]
    pub expression: String,
}

/// Definition of a database property, as returned by the API.
///
/// ```json
/// {"id": "%40Q%5BM", "name": "Food group", "type": "select",
///  "select": {"options": [{"id": "e28f74fc", "name": "Vegetable", "color": "green"}]}}
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseProperty {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: PropertyType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_select: Option<SelectConfig>,

    /// status options. Status groups are not modeled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SelectConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<FormulaConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup: Option<serde_json::Value>,
}

impl DatabaseProperty {
    /// Creates a property definition with no configuration
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        DatabaseProperty {
            id: String::new(),
            name: name.into(),
            kind,
            select: None,
            multi_select: None,
            status: None,
            number: None,
            formula: None,
            relation: None,
            rollup: None,
        }
    }

    /// Sets the options for a select, multi-select, or status property.
    /// Has no effect on other types.
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        let config = Some(SelectConfig { options });
        match self.kind {
            PropertyType::Select => self.select = config,
            PropertyType::MultiSelect => self.multi_select = config,
            PropertyType::Status => self.status = config,
            _ => {}
        }
        self
    }

    /// Declared options for select, multi-select, and status properties.
    /// Empty for all other types.
    pub fn options(&self) -> &[SelectOption] {
        let config = match self.kind {
            PropertyType::Select => self.select.as_ref(),
            PropertyType::MultiSelect => self.multi_select.as_ref(),
            PropertyType::Status => self.status.as_ref(),
            _ => None,
        };
        config.map(|c| c.options.as_slice()).unwrap_or_default()
    }

    /// Converts the definition into a schema that can be sent to create a
    /// column of the same type in another database. Option ids are dropped.
    /// Returns None for types that can't be created through the API
    /// (status, relation, rollup, unique_id, button, verification, unknown).
    pub fn to_schema(&self) -> Option<PropertySchema> {
        let options = || {
            self.options()
                .iter()
                .map(|opt| SelectOption {
                    id: None,
                    ..opt.clone()
                })
                .collect::<Vec<_>>()
        };
        let schema = match &self.kind {
            PropertyType::Title => PropertySchema::Title {},
            PropertyType::RichText => PropertySchema::RichText {},
            PropertyType::Number => PropertySchema::Number {
                format: self.number.as_ref().map(|n| n.format),
            },
            PropertyType::Select => PropertySchema::Select { options: options() },
            PropertyType::MultiSelect => PropertySchema::MultiSelect { options: options() },
            PropertyType::Date => PropertySchema::Date {},
            PropertyType::People => PropertySchema::People {},
            PropertyType::Files => PropertySchema::Files {},
            PropertyType::Checkbox => PropertySchema::Checkbox {},
            PropertyType::Url => PropertySchema::Url {},
            PropertyType::Email => PropertySchema::Email {},
            PropertyType::PhoneNumber => PropertySchema::PhoneNumber {},
            PropertyType::Formula => PropertySchema::Formula {
                expression: self
                    .formula
                    .as_ref()
                    .map(|f| f.expression.clone())
                    .unwrap_or_default(),
            },
            PropertyType::CreatedTime => PropertySchema::CreatedTime {},
            PropertyType::CreatedBy => PropertySchema::CreatedBy {},
            PropertyType::LastEditedTime => PropertySchema::LastEditedTime {},
            PropertyType::LastEditedBy => PropertySchema::LastEditedBy {},
            PropertyType::Status
            | PropertyType::Relation
            | PropertyType::Rollup
            | PropertyType::UniqueId
            | PropertyType::Button
            | PropertyType::Verification
            | PropertyType::Unknown(_) => return None,
        };
        Some(schema)
    }
}

/// Column definition for create and update database requests.
/// Serializes as `{"<type>": {<config>}}`, e.g. `{"select": {"options": [..]}}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PropertySchema {
    Title {},
    RichText {},
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<NumberFormat>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    MultiSelect {
        options: Vec<SelectOption>,
    },
    Date {},
    People {},
    Files {},
    Checkbox {},
    Url {},
    Email {},
    PhoneNumber {},
    Formula {
        expression: String,
    },
    CreatedTime {},
    CreatedBy {},
    LastEditedTime {},
    LastEditedBy {},
}

impl PropertySchema {
    pub fn title() -> Self {
        Self::Title {}
    }

    pub fn rich_text() -> Self {
        Self::RichText {}
    }

    pub fn number() -> Self {
        Self::Number { format: None }
    }

    pub fn date() -> Self {
        Self::Date {}
    }

    pub fn checkbox() -> Self {
        Self::Checkbox {}
    }

    /// Select column with the named options
    pub fn select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Select {
            options: names.into_iter().map(SelectOption::named).collect(),
        }
    }

    /// Multi-select column with the named options
    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect {
            options: names.into_iter().map(SelectOption::named).collect(),
        }
    }

    /// Builds a schema for a type, with options for select and multi-select.
    /// Returns None for types that can't be created through the API.
    pub fn from_type(kind: &PropertyType, options: Vec<String>) -> Option<Self> {
        let schema = match kind {
            PropertyType::Select => Self::select(options),
            PropertyType::MultiSelect => Self::multi_select(options),
            PropertyType::Formula => Self::Formula {
                expression: options.join(","),
            },
            other => DatabaseProperty::new("", other.clone()).to_schema()?,
        };
        Some(schema)
    }

    pub fn kind(&self) -> PropertyType {
        match self {
            Self::Title {} => PropertyType::Title,
            Self::RichText {} => PropertyType::RichText,
            Self::Number { .. } => PropertyType::Number,
            Self::Select { .. } => PropertyType::Select,
            Self::MultiSelect { .. } => PropertyType::MultiSelect,
            Self::Date {} => PropertyType::Date,
            Self::People {} => PropertyType::People,
            Self::Files {} => PropertyType::Files,
            Self::Checkbox {} => PropertyType::Checkbox,
            Self::Url {} => PropertyType::Url,
            Self::Email {} => PropertyType::Email,
            Self::PhoneNumber {} => PropertyType::PhoneNumber,
            Self::Formula { .. } => PropertyType::Formula,
            Self::CreatedTime {} => PropertyType::CreatedTime,
            Self::CreatedBy {} => PropertyType::CreatedBy,
            Self::LastEditedTime {} => PropertyType::LastEditedTime,
            Self::LastEditedBy {} => PropertyType::LastEditedBy,
        }
    }
}
