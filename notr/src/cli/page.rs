use anyhow::Result;
use notion_api::prelude::*;
use tracing::debug;

use crate::{
    cli::{AppContext, PageArgs, PageCommands},
    filter::{parse_key_value, parse_property_value},
};

pub async fn handle(ctx: &AppContext, args: PageArgs) -> Result<()> {
    match args.command {
        PageCommands::Create {
            database_id,
            random,
            props,
        } => {
            let db = ctx.client.database(&database_id).get().await?;
            let record = build_record(&db.properties, random, &props)?;
            let page = ctx
                .client
                .new_page(&db.id)
                .properties(record)
                .create()
                .await?;
            ctx.output.emit_json(&page)
        }
        PageCommands::Get { page_id } => {
            let page = ctx.client.page(page_id).get().await?;
            ctx.output.emit_json(&page)
        }
        PageCommands::Archive { page_id } => {
            let page = ctx.client.update_page(page_id).archived(true).update().await?;
            ctx.output.emit_json(&page)
        }
        PageCommands::Property {
            page_id,
            property_id,
            raw,
        } => {
            let page = ctx.client.page(&page_id).get().await?;
            let property_id = page
                .properties
                .get(&property_id)
                .map_or(property_id, |prop| prop.id.clone());
            debug!(%page_id, %property_id, "retrieving property");

            let value = ctx
                .client
                .page_property(&page_id, &property_id)
                .collect_all()
                .await?;
            if raw {
                return ctx.output.emit_json(&value);
            }
            ctx.output.emit_text(&format_response(&value))
        }
    }
}

/// Record for a new page: random values for the schema when `random` is set,
/// then `name=value` arguments, which replace random values of the same name.
fn build_record(schema: &Schema, random: bool, props: &[String]) -> Result<Record> {
    let mut record = if random {
        generate_record(schema)
    } else {
        Record::new()
    };
    for pair in props {
        let (name, value) = parse_key_value(pair)?;
        let input = parse_property_value(schema, &name, &value)?;
        record.insert(name, input);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::from([
            ("Name".to_string(), DatabaseProperty::new("Name", PropertyType::Title)),
            ("done".to_string(), DatabaseProperty::new("done", PropertyType::Checkbox)),
        ])
    }

    #[test]
    fn test_build_record_overrides_random() {
        let record = build_record(&schema(), true, &["Name=fixed".to_string()]).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["Name"], PropertyValueInput::title("fixed"));
    }

    #[test]
    fn test_build_record_explicit_only() {
        let record = build_record(&schema(), false, &["done=false".to_string()]).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["done"], PropertyValueInput::Checkbox { checkbox: false });
        assert!(build_record(&schema(), false, &["nope=1".to_string()]).is_err());
    }
}
