//! Rich text
//!
//! Titles, text properties, and descriptions are arrays of rich text
//! fragments. Responses carry the full fragment ([`RichText`]); requests
//! only need the text content ([`RichTextInput`]).

use serde::{Deserialize, Serialize};

use crate::schema::Color;

/// A rich text fragment as returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RichText {
    #[serde(flatten)]
    pub content: RichTextContent,

    /// Unformatted text of the fragment
    #[serde(default)]
    pub plain_text: String,

    #[serde(default)]
    pub annotations: Annotations,

    /// Url of any link or mention in the fragment
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextContent {
    Text { text: TextContent },
    /// user, page, database, date, or link mention. Kept as raw json.
    Mention { mention: serde_json::Value },
    Equation { equation: Equation },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TextContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Equation {
    pub expression: String,
}

/// Styling applied to a fragment
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

/// Rich text in request bodies: `{"type":"text","text":{"content":"..."}}`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextInput {
    Text { text: TextContent },
}

impl RichTextInput {
    pub fn text(content: impl Into<String>) -> Self {
        RichTextInput::Text {
            text: TextContent {
                content: content.into(),
                link: None,
            },
        }
    }

    /// A single-fragment rich text array, the usual shape for titles and descriptions
    pub fn plain(content: impl Into<String>) -> Vec<Self> {
        vec![Self::text(content)]
    }

    pub fn content(&self) -> &str {
        match self {
            RichTextInput::Text { text } => &text.content,
        }
    }
}

/// Concatenates the plain text of all fragments.
pub fn plain_text(items: &[RichText]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}
