//! Parsing of command-line property, schema, and filter arguments

use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use notion_api::prelude::*;
use serde_json::Number;

/// Splits `name=value`. The name is trimmed and must not be empty.
pub fn parse_key_value(input: &str) -> Result<(String, String)> {
    let (left, value) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value: {input}"))?;
    let key = left.trim();
    if key.is_empty() {
        bail!("missing name: {input}");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parses a column definition `name:type[:opt,opt,..]`, e.g. `tags:multi_select:red,green`.
/// Options are only meaningful for select and multi_select; for formula they are the expression.
pub fn parse_schema_property(input: &str) -> Result<(String, PropertySchema)> {
    let mut parts = input.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let kind = parts.next().unwrap_or_default().trim();
    let options = split_list(parts.next().unwrap_or_default());

    if name.is_empty() || kind.is_empty() {
        bail!("invalid property definition (expected name:type[:options]): {input}");
    }
    let kind = PropertyType::from(kind.to_string());
    if let PropertyType::Unknown(name) = &kind {
        bail!("unknown property type: {name}");
    }
    let schema = PropertySchema::from_type(&kind, options)
        .ok_or_else(|| anyhow!("property type {kind} can't be created from the command line"))?;
    Ok((name.to_string(), schema))
}

/// Converts a command-line value to a property value, using the column type from the schema.
pub fn parse_property_value(
    schema: &Schema,
    name: &str,
    value: &str,
) -> Result<PropertyValueInput> {
    let property = schema
        .get(name)
        .ok_or_else(|| anyhow!("database has no property named '{name}'"))?;
    let input = match &property.kind {
        PropertyType::Title => PropertyValueInput::title(value),
        PropertyType::RichText => PropertyValueInput::rich_text(value),
        PropertyType::Number => PropertyValueInput::Number {
            number: parse_number(value).ok_or_else(|| anyhow!("{name}: not a number: {value}"))?,
        },
        PropertyType::Select => PropertyValueInput::select(value),
        PropertyType::Status => PropertyValueInput::Status {
            status: SelectOption::named(value),
        },
        PropertyType::MultiSelect => PropertyValueInput::MultiSelect {
            multi_select: split_list(value)
                .into_iter()
                .map(SelectOption::named)
                .collect(),
        },
        PropertyType::Date => PropertyValueInput::Date {
            date: DateInput {
                start: value.to_string(),
                end: None,
            },
        },
        PropertyType::Checkbox => PropertyValueInput::Checkbox {
            checkbox: parse_bool(value)
                .ok_or_else(|| anyhow!("{name}: expected true or false: {value}"))?,
        },
        PropertyType::Url => PropertyValueInput::Url { url: value.into() },
        PropertyType::Email => PropertyValueInput::Email {
            email: value.into(),
        },
        PropertyType::PhoneNumber => PropertyValueInput::PhoneNumber {
            phone_number: value.into(),
        },
        PropertyType::Relation => PropertyValueInput::Relation {
            relation: split_list(value)
                .into_iter()
                .map(|id| RelationRef { id })
                .collect(),
        },
        other => bail!("{name}: setting {other} properties is not supported"),
    };
    Ok(input)
}

/// Parses a sort `name` or `name:asc` / `name:desc`.
pub fn parse_sort(input: &str) -> Result<Sort> {
    let (name, direction) = input.rsplit_once(':').unwrap_or((input, "asc"));
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid sort: {input}");
    }
    let sort = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Sort::ascending(name),
        "desc" | "descending" => Sort::descending(name),
        other => bail!("invalid sort direction: {other}"),
    };
    Ok(sort)
}

/// Property id as used in filters. Schema ids are url-encoded.
pub fn decode_property_id(id: &str) -> String {
    urlencoding::decode(id).map_or_else(|_| id.to_string(), |s| s.into_owned())
}

pub fn parse_bool(value: &str) -> Option<bool> {
    bool::from_str(&value.to_ascii_lowercase()).ok()
}

pub fn parse_number(value: &str) -> Option<Number> {
    if let Ok(num) = value.parse::<i64>() {
        return Some(Number::from(num));
    }
    if let Ok(num) = value.parse::<u64>() {
        return Some(Number::from(num));
    }
    if let Ok(num) = value.parse::<f64>() {
        return Number::from_f64(num);
    }
    None
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::from([
            ("Name".to_string(), DatabaseProperty::new("Name", PropertyType::Title)),
            ("amount".to_string(), DatabaseProperty::new("amount", PropertyType::Number)),
            ("done".to_string(), DatabaseProperty::new("done", PropertyType::Checkbox)),
            ("tags".to_string(), DatabaseProperty::new("tags", PropertyType::MultiSelect)),
            ("who".to_string(), DatabaseProperty::new("who", PropertyType::People)),
        ])
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value(" cat = a=b ").unwrap(),
            ("cat".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_schema_property() {
        let (name, schema) = parse_schema_property("tags:multi_select:tag1, tag2").unwrap();
        assert_eq!(name, "tags");
        assert_eq!(schema, PropertySchema::multi_select(["tag1", "tag2"]));

        let (_, schema) = parse_schema_property("launch date:date").unwrap();
        assert_eq!(schema, PropertySchema::date());

        assert!(parse_schema_property("x:hologram").is_err());
        assert!(parse_schema_property("x:rollup").is_err());
        assert!(parse_schema_property("x").is_err());
    }

    #[test]
    fn test_parse_property_value() {
        let schema = schema();
        assert_eq!(
            parse_property_value(&schema, "Name", "hello").unwrap(),
            PropertyValueInput::title("hello")
        );
        assert_eq!(
            parse_property_value(&schema, "amount", "12").unwrap(),
            PropertyValueInput::Number { number: 12.into() }
        );
        assert!(parse_property_value(&schema, "amount", "twelve").is_err());
        assert_eq!(
            parse_property_value(&schema, "done", "TRUE").unwrap(),
            PropertyValueInput::Checkbox { checkbox: true }
        );
        assert_eq!(
            parse_property_value(&schema, "tags", "a,b").unwrap(),
            PropertyValueInput::MultiSelect {
                multi_select: vec![SelectOption::named("a"), SelectOption::named("b")]
            }
        );
        assert!(parse_property_value(&schema, "who", "x").is_err());
        assert!(parse_property_value(&schema, "missing", "x").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("Name").unwrap(), Sort::ascending("Name"));
        assert_eq!(parse_sort("Name:desc").unwrap(), Sort::descending("Name"));
        assert!(parse_sort("Name:sideways").is_err());
    }

    #[test]
    fn test_decode_property_id() {
        assert_eq!(decode_property_id("%40Q%5BM"), "@Q[M");
        assert_eq!(decode_property_id("title"), "title");
    }
}
