//! Display formatting for property values
//!
//! Converts a [`PropertyItem`] or [`PropertyItemResponse`] into a single
//! human-readable line.
//!
//! - absent optional values format as `""`
//! - times format as ISO-8601 UTC with milliseconds, e.g. `2022-03-01T19:05:00.000Z`
//! - users format as `<id>: <name>`, or `<id>: Unknown Name`
//! - formula and rollup values that are missing or empty format as `???`
//! - list responses join their formatted items with `", "`

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use snafu::prelude::*;

use crate::{
    Result,
    error::{DeserializationSnafu, UnexpectedVariantSnafu},
    rich_text::plain_text,
    schema::SelectOption,
    values::{DateValue, FormulaValue, PropertyItem, PropertyItemResponse, RollupValue, User},
};

const UNKNOWN_VALUE: &str = "???";

const ITEM_TYPES: &[&str] = &[
    "checkbox",
    "created_by",
    "created_time",
    "date",
    "email",
    "url",
    "number",
    "phone_number",
    "select",
    "multi_select",
    "people",
    "last_edited_by",
    "last_edited_time",
    "title",
    "rich_text",
    "files",
    "formula",
    "rollup",
    "relation",
    "status",
];

const FORMULA_TYPES: &[&str] = &["string", "number", "boolean", "date"];

const ROLLUP_TYPES: &[&str] = &["number", "date", "array", "incomplete", "unsupported"];

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalizes an ISO-8601 date or date-time to UTC with milliseconds.
///
/// - date-times with an offset are converted to UTC
/// - date-times without an offset are wall-clock times in `time_zone`
///   (an IANA name such as `America/New_York`), or UTC when there is none
/// - date-only values are midnight UTC
///
/// Unparseable values are returned as-is.
fn format_date_str(value: &str, time_zone: Option<&str>) -> String {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return format_time(&time.with_timezone(&Utc));
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        let tz = time_zone
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC);
        // earliest: wall times repeated by a DST change resolve to the first one
        if let Some(time) = tz.from_local_datetime(&local).earliest() {
            return format_time(&time.with_timezone(&Utc));
        }
    }
    if let Some(time) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return format_time(&time.and_utc());
    }
    value.to_string()
}

/// Start of a date value, or None if it has no start
fn format_date_value(date: &DateValue) -> Option<String> {
    (!date.start.is_empty()).then(|| format_date_str(&date.start, date.time_zone.as_deref()))
}

fn format_date(date: Option<&DateValue>) -> String {
    date.and_then(format_date_value).unwrap_or_default()
}

fn format_user(user: &User) -> String {
    format!(
        "{}: {}",
        user.id,
        user.name.as_deref().unwrap_or("Unknown Name")
    )
}

fn format_option(option: &SelectOption) -> String {
    match &option.id {
        Some(id) => format!("{id} {}", option.name),
        None => option.name.clone(),
    }
}

fn format_formula(formula: &FormulaValue) -> String {
    match formula {
        FormulaValue::String { string } => string
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_VALUE)
            .to_string(),
        FormulaValue::Number { number } => number
            .map(|n| n.to_string())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
        FormulaValue::Boolean { boolean } => boolean
            .map(|b| b.to_string())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
        FormulaValue::Date { date } => date
            .as_ref()
            .and_then(format_date_value)
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
    }
}

fn format_rollup(rollup: &RollupValue) -> String {
    match rollup {
        RollupValue::Number { number } => number
            .map(|n| n.to_string())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
        RollupValue::Date { date } => date
            .as_ref()
            .and_then(format_date_value)
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
        RollupValue::Array { array } => serde_json::to_string(array).unwrap_or_default(),
        RollupValue::Incomplete { .. } => "incomplete".to_string(),
        RollupValue::Unsupported { .. } => "unsupported".to_string(),
    }
}

/// Formats one property item as a display string.
pub fn format_property_item(item: &PropertyItem) -> String {
    match item {
        PropertyItem::Checkbox { checkbox } => checkbox.to_string(),
        PropertyItem::CreatedBy { created_by } => format_user(created_by),
        PropertyItem::CreatedTime { created_time } => format_time(created_time),
        PropertyItem::Date { date } => format_date(date.as_ref()),
        PropertyItem::Email { email } => email.clone().unwrap_or_default(),
        PropertyItem::Url { url } => url.clone().unwrap_or_default(),
        PropertyItem::Number { number } => number.map(|n| n.to_string()).unwrap_or_default(),
        PropertyItem::PhoneNumber { phone_number } => phone_number.clone().unwrap_or_default(),
        PropertyItem::Select { select } => select.as_ref().map(format_option).unwrap_or_default(),
        PropertyItem::MultiSelect { multi_select } => multi_select
            .as_deref()
            .map(|options| {
                options
                    .iter()
                    .map(format_option)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default(),
        PropertyItem::People { people } => format_user(people),
        PropertyItem::LastEditedBy { last_edited_by } => format_user(last_edited_by),
        PropertyItem::LastEditedTime { last_edited_time } => format_time(last_edited_time),
        PropertyItem::Title { title } => plain_text(std::slice::from_ref(title)),
        PropertyItem::RichText { rich_text } => plain_text(std::slice::from_ref(rich_text)),
        PropertyItem::Files { files } => files
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyItem::Formula { formula } => format_formula(formula),
        PropertyItem::Rollup { rollup } => format_rollup(rollup),
        PropertyItem::Relation { relation } => relation
            .as_ref()
            .map(|r| r.id.clone())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
        PropertyItem::Status { status } => status
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default(),
    }
}

/// Formats a page property response. List responses join their items with `", "`.
pub fn format_response(response: &PropertyItemResponse) -> String {
    match response {
        PropertyItemResponse::PropertyItem(item) => format_property_item(item),
        PropertyItemResponse::List(list) => list
            .results
            .iter()
            .map(format_property_item)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn tag_of<'a>(value: &'a serde_json::Value, key: &str) -> &'a str {
    value.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

fn check_tag(tag: &str, known: &[&str], path: &str) -> Result<()> {
    ensure!(
        known.contains(&tag),
        UnexpectedVariantSnafu {
            tag: format!("{path}={tag}"),
        }
    );
    Ok(())
}

fn check_item(value: &serde_json::Value) -> Result<()> {
    let kind = tag_of(value, "type");
    check_tag(kind, ITEM_TYPES, "type")?;
    match kind {
        "formula" => check_tag(
            tag_of(&value["formula"], "type"),
            FORMULA_TYPES,
            "formula.type",
        ),
        "rollup" => check_tag(
            tag_of(&value["rollup"], "type"),
            ROLLUP_TYPES,
            "rollup.type",
        ),
        _ => Ok(()),
    }
}

/// Formats a raw page property response.
///
/// Fails with [`UnexpectedVariant`](crate::error::NotionError::UnexpectedVariant)
/// if the `object`, `type`, `formula.type`, or `rollup.type` tag names a
/// variant this library doesn't model, and with
/// [`Deserialization`](crate::error::NotionError::Deserialization) if the value is
/// otherwise malformed.
pub fn format_json(value: &serde_json::Value) -> Result<String> {
    match tag_of(value, "object") {
        "property_item" => check_item(value)?,
        "list" => {
            let results = value
                .get("results")
                .and_then(|r| r.as_array())
                .map(Vec::as_slice)
                .unwrap_or_default();
            for item in results {
                check_item(item)?;
            }
        }
        other => {
            return UnexpectedVariantSnafu {
                tag: format!("object={other}"),
            }
            .fail();
        }
    }
    let response: PropertyItemResponse =
        serde_json::from_value(value.clone()).context(DeserializationSnafu)?;
    Ok(format_response(&response))
}
