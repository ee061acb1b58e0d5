use anyhow::{Result, bail};
use notion_api::prelude::*;

use crate::{
    cli::{AppContext, DatabaseArgs, DatabaseCommands},
    filter::{parse_key_value, parse_schema_property, parse_sort},
    output::{OutputFormat, SchemaColumn},
};

pub async fn handle(ctx: &AppContext, args: DatabaseArgs) -> Result<()> {
    match args.command {
        DatabaseCommands::Get {
            database_id,
            schema,
        } => {
            let db = ctx.client.database(database_id).get().await?;
            if schema {
                return emit_schema(ctx, &db.properties);
            }
            ctx.output.emit_json(&db)
        }
        DatabaseCommands::Create {
            title,
            parent,
            description,
            inline,
            props,
        } => {
            let mut request = ctx.client.new_database(title).description(description);
            if let Some(parent) = parent {
                request = request.parent_page(parent);
            }
            if inline {
                request = request.inline(true);
            }
            for def in &props {
                let (name, schema) = parse_schema_property(def)?;
                request = request.property(name, schema);
            }
            let db = request.create().await?;
            ctx.output.emit_json(&db)
        }
        DatabaseCommands::Update {
            database_id,
            title,
            description,
            add,
            rename,
            remove,
            archive,
            restore,
        } => {
            let mut request = ctx.client.update_database(database_id);
            if let Some(title) = title {
                request = request.title(title);
            }
            if let Some(description) = description {
                request = request.description(description);
            }
            for def in &add {
                let (name, schema) = parse_schema_property(def)?;
                request = request.add_property(name, schema);
            }
            for pair in &rename {
                let (old, new) = parse_key_value(pair)?;
                request = request.rename_property(old, new);
            }
            for name in remove {
                request = request.remove_property(name);
            }
            if archive || restore {
                request = request.archived(archive);
            }
            let db = request.update().await?;
            ctx.output.emit_json(&db)
        }
        DatabaseCommands::Query {
            database_id,
            select,
            contains,
            sort,
            limit,
            all,
        } => {
            let mut request = ctx.client.query_database(database_id).page_size(limit);
            if let Some(filter) = build_filter(&select, &contains)? {
                request = request.filter(filter);
            }
            for key in &sort {
                request = request.sort(parse_sort(key)?);
            }

            let result = request.list().await?;
            if all {
                let pages = result.collect_all().await?;
                return ctx.output.emit_table(&pages);
            }
            if ctx.output.format() == OutputFormat::Table {
                return ctx.output.emit_table(&result.results);
            }
            ctx.output.emit_json(&result)
        }
    }
}

fn emit_schema(ctx: &AppContext, schema: &Schema) -> Result<()> {
    let columns = schema
        .iter()
        .map(|(name, property)| SchemaColumn { name, property })
        .collect::<Vec<_>>();
    if ctx.output.format() == OutputFormat::Table {
        return ctx.output.emit_table(&columns);
    }
    ctx.output.emit_json(schema)
}

/// Combines `--select` and `--contains` arguments. More than one condition is joined with `and`.
pub(crate) fn build_filter(select: &[String], contains: &[String]) -> Result<Option<Filter>> {
    let mut filters = Vec::new();
    for pair in select {
        let (column, value) = parse_key_value(pair)?;
        filters.push(Filter::select_equals(column, value));
    }
    for pair in contains {
        let (column, text) = parse_key_value(pair)?;
        if text.is_empty() {
            bail!("--contains {column}: empty search text");
        }
        filters.push(Filter::text_contains(column, text));
    }
    Ok(match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Filter::and(filters)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        assert!(build_filter(&[], &[]).unwrap().is_none());

        let single = build_filter(&["category=cat1".to_string()], &[]).unwrap();
        assert_eq!(single, Some(Filter::select_equals("category", "cat1")));

        let both = build_filter(
            &["category=cat1".to_string()],
            &["description=lorem".to_string()],
        )
        .unwrap();
        assert_eq!(
            both,
            Some(Filter::and(vec![
                Filter::select_equals("category", "cat1"),
                Filter::text_contains("description", "lorem"),
            ]))
        );

        assert!(build_filter(&[], &["description=".to_string()]).is_err());
    }
}
