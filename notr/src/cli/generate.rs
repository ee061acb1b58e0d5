use anyhow::Result;
use notion_api::prelude::*;

use crate::cli::AppContext;

/// Prints `count` random records for the schema of a database. Nothing is written.
pub async fn handle(ctx: &AppContext, database_id: &str, count: u32) -> Result<()> {
    let db = ctx.client.database(database_id).get().await?;
    let records = (0..count)
        .map(|_| generate_record(&db.properties))
        .collect::<Vec<_>>();
    ctx.output.emit_json(&records)
}
