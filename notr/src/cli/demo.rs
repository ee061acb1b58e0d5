//! Scripted walk through the client: create a database, update it, fill it
//! with random rows, then optionally read the rows back and query them.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Timelike, Utc};
use notion_api::{generate::random_word, prelude::*};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use tracing::{debug, info, warn};

use crate::{
    cli::{AppContext, DemoArgs},
    filter::decode_property_id,
    output::page_title,
};

const DATABASE_TITLE: &str = "test-database";
const DATABASE_DESCRIPTION: &str = "non default test-database-description";
const UPDATED_TITLE: &str = "new title";
const UPDATED_DESCRIPTION: &str = "updated description";
const ADDED_PROPERTY: &str = "new property";

pub async fn handle(ctx: &AppContext, args: DemoArgs) -> Result<()> {
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    // created_time has minute precision
    let start = truncate_to_minute(Utc::now());

    let schema = match &args.template_db {
        Some(template_id) => {
            let template = ctx
                .client
                .database(template_id)
                .get()
                .await
                .with_context(|| format!("retrieving template database {template_id}"))?;
            info!(id = %template.id, title = %template.title_text(), "using template schema");
            schema_from_template(&template.properties)
        }
        None => manual_schema(),
    };

    let db = ctx
        .client
        .new_database(DATABASE_TITLE)
        .description(DATABASE_DESCRIPTION)
        .properties(schema)
        .create()
        .await
        .context("creating database")?;
    ctx.output.emit_json(&db)?;

    let db = ctx.client.database(&db.id).get().await?;
    ctx.output.emit_json(&db)?;

    let db = ctx
        .client
        .update_database(&db.id)
        .title(UPDATED_TITLE)
        .description(UPDATED_DESCRIPTION)
        .add_property(ADDED_PROPERTY, PropertySchema::rich_text())
        .update()
        .await
        .context("updating database")?;
    ctx.output.emit_json(&db)?;

    for row in 0..args.rows {
        let record = generate_record_with(&db.properties, &mut rng);
        let page = ctx
            .client
            .new_page(&db.id)
            .properties(record)
            .create()
            .await
            .with_context(|| format!("creating row {row}"))?;
        debug!(row, id = %page.id, "created row");
        ctx.output.emit_json(&page)?;
    }

    if args.read_back {
        read_back(ctx, &db, start).await?;
    }
    if args.query {
        query(ctx, &db, &mut rng).await?;
    }
    Ok(())
}

/// Prints every property of the rows created since `start`, formatted as text.
async fn read_back(ctx: &AppContext, db: &Database, start: DateTime<Utc>) -> Result<()> {
    let pages = ctx
        .client
        .query_database(&db.id)
        .list()
        .await?
        .collect_all()
        .await?;

    let mut skipped = 0usize;
    for page in &pages {
        if !page.is_full() {
            continue;
        }
        if page.created_time < start {
            skipped += 1;
            continue;
        }
        ctx.output.emit_text(&format!("{} ({})", page_title(page), page.id))?;
        for (name, prop) in &page.properties {
            let value = ctx
                .client
                .page_property(&page.id, &prop.id)
                .collect_all()
                .await
                .with_context(|| format!("retrieving {name} of {}", page.id))?;
            ctx.output.emit_text(&format!(
                " - {name} {} - {}",
                prop.id,
                format_response(&value)
            ))?;
        }
    }
    ctx.output.emit_text(&format!("skipped {skipped} rows created before this run"))
}

/// Counts rows matching a random select option, then rows whose text column
/// contains a random word.
async fn query(ctx: &AppContext, db: &Database, rng: &mut StdRng) -> Result<()> {
    let (column, value) = random_select_value(&db.properties, rng)
        .ok_or_else(|| anyhow!("database has no select column with options"))?;
    let count = ctx
        .client
        .query_database(&db.id)
        .filter(Filter::select_equals(&column, &value))
        .list()
        .await?
        .collect_all()
        .await?
        .len();
    ctx.output.emit_text(&format!("{count} rows with {column} = {value}"))?;

    let text_columns = db
        .properties
        .iter()
        .filter(|(_, prop)| prop.kind == PropertyType::RichText)
        .collect::<Vec<_>>();
    let Some((name, prop)) = text_columns.choose(rng) else {
        warn!("database has no rich_text column, skipping text query");
        return Ok(());
    };
    let property_id = decode_property_id(&prop.id);
    let word = random_word(rng);
    let count = ctx
        .client
        .query_database(&db.id)
        .filter(Filter::text_contains(&property_id, word))
        .list()
        .await?
        .collect_all()
        .await?
        .len();
    ctx.output.emit_text(&format!("{count} rows with {name} containing '{word}'"))
}

/// Column definitions used when no template database is given
fn manual_schema() -> Vec<(String, PropertySchema)> {
    let option = |name: &str, color: Option<Color>| SelectOption {
        id: None,
        name: name.to_string(),
        color,
    };
    vec![
        ("not default title column".into(), PropertySchema::title()),
        ("launch date".into(), PropertySchema::date()),
        (
            "tags".into(),
            PropertySchema::MultiSelect {
                options: vec![option("tag1", None), option("tag2", Some(Color::Green))],
            },
        ),
        (
            "category".into(),
            PropertySchema::Select {
                options: vec![option("cat1", None), option("cat2", Some(Color::Green))],
            },
        ),
        ("email".into(), PropertySchema::Email {}),
        ("checked".into(), PropertySchema::checkbox()),
        ("twitter".into(), PropertySchema::Url {}),
        ("amount".into(), PropertySchema::number()),
        ("description".into(), PropertySchema::rich_text()),
        ("contact_nr".into(), PropertySchema::PhoneNumber {}),
    ]
}

/// Copies the columns of a template database. Columns that can't be created
/// through the API are left out.
fn schema_from_template(template: &Schema) -> Vec<(String, PropertySchema)> {
    template
        .iter()
        .filter_map(|(name, prop)| match prop.to_schema() {
            Some(schema) => Some((name.clone(), schema)),
            None => {
                warn!(property = %name, kind = %prop.kind, "template column can't be copied, skipped");
                None
            }
        })
        .collect()
}

fn truncate_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_schema_has_one_title() {
        let schema = manual_schema();
        assert_eq!(schema.len(), 10);
        let titles = schema
            .iter()
            .filter(|(_, s)| s.kind() == PropertyType::Title)
            .count();
        assert_eq!(titles, 1);
    }

    #[test]
    fn test_schema_from_template_skips_uncopyable() {
        let template = Schema::from([
            (
                "Name".to_string(),
                DatabaseProperty::new("Name", PropertyType::Title),
            ),
            (
                "cat".to_string(),
                DatabaseProperty::new("cat", PropertyType::Select).with_options(vec![
                    SelectOption {
                        id: Some("abc".into()),
                        name: "cat1".into(),
                        color: Some(Color::Red),
                    },
                ]),
            ),
            (
                "rel".to_string(),
                DatabaseProperty::new("rel", PropertyType::Relation),
            ),
        ]);
        let schema = schema_from_template(&template);
        assert_eq!(
            schema,
            vec![
                ("Name".to_string(), PropertySchema::title()),
                (
                    "cat".to_string(),
                    PropertySchema::Select {
                        options: vec![SelectOption {
                            id: None,
                            name: "cat1".into(),
                            color: Some(Color::Red),
                        }]
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_truncate_to_minute() {
        let time = DateTime::parse_from_rfc3339("2024-03-01T10:15:42.123Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(truncate_to_minute(time).to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }
}
