/*
 * notr - create, query, and seed Notion databases
 *
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use notion_api::prelude::*;
use tracing::{info, warn};

use crate::output::{Output, OutputFormat};

pub mod database;
pub mod demo;
pub mod generate;
pub mod page;

#[derive(Parser, Debug)]
#[command(name = "notr")]
#[command(
    author,
    version,
    about = "notr: create, query, and seed Notion databases",
    long_about = None
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// API endpoint URL. Default: environment `NOTION_URL` or <https://api.notion.com>
    #[arg(short = 'u', long, env = "NOTION_URL")]
    pub url: Option<String>,

    /// Integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Default parent page for new databases
    #[arg(long, env = "NOTION_BASE_PAGE_ID")]
    pub root_page: Option<String>,

    /// Write output to file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// JSON output (default)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Table output format
    #[arg(short, long, global = true)]
    pub table: bool,

    /// Quiet mode - suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (repeat for more: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Database retrieve, create, update, and query
    #[command(alias = "db")]
    Database(DatabaseArgs),

    /// Page create, retrieve, and property values
    #[command(alias = "pages")]
    Page(PageArgs),

    /// Print random records for a database schema, without writing them
    Generate {
        /// database id
        database_id: String,

        /// number of records
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },

    /// Run the scripted example: create a database, update it, add random rows,
    /// then optionally read them back and query
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub struct DatabaseArgs {
    #[command(subcommand)]
    pub command: DatabaseCommands,
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Retrieve a database
    Get {
        /// database id
        database_id: String,

        /// Print only the schema
        #[arg(long)]
        schema: bool,
    },

    /// Create a database
    Create {
        /// database title
        title: String,

        /// Parent page id. Default: --root-page
        #[arg(long)]
        parent: Option<String>,

        /// Database description
        #[arg(long, default_value = "")]
        description: String,

        /// Create as an inline database
        #[arg(long)]
        inline: bool,

        /// Column definition `name:type[:opt,opt]` (repeatable). Default: a "Name" title column
        #[arg(short, long = "prop", value_name = "DEF")]
        props: Vec<String>,
    },

    /// Update title, description, or columns of a database
    Update {
        /// database id
        database_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Add a column `name:type[:opt,opt]` (repeatable)
        #[arg(long, value_name = "DEF")]
        add: Vec<String>,

        /// Rename a column `old=new` (repeatable)
        #[arg(long, value_name = "OLD=NEW")]
        rename: Vec<String>,

        /// Remove a column by name or id (repeatable)
        #[arg(long, value_name = "NAME")]
        remove: Vec<String>,

        /// Archive the database
        #[arg(long, conflicts_with = "restore")]
        archive: bool,

        /// Restore an archived database
        #[arg(long)]
        restore: bool,
    },

    /// Query rows of a database
    Query {
        /// database id
        database_id: String,

        /// Match a select column `column=value` (repeatable; all must match)
        #[arg(long, value_name = "COL=VALUE")]
        select: Vec<String>,

        /// Match a rich text column containing text `column=text` (repeatable)
        #[arg(long, value_name = "COL=TEXT")]
        contains: Vec<String>,

        /// Sort by `column[:asc|desc]` (repeatable)
        #[arg(long, value_name = "COL")]
        sort: Vec<String>,

        /// Page size (1-100)
        #[arg(short = 'l', long, default_value_t = 100)]
        limit: u32,

        /// Fetch all pages of results
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Args, Debug)]
pub struct PageArgs {
    #[command(subcommand)]
    pub command: PageCommands,
}

#[derive(Subcommand, Debug)]
pub enum PageCommands {
    /// Create a page (row) in a database
    Create {
        /// database id
        database_id: String,

        /// Fill every supported column with a random value
        #[arg(long)]
        random: bool,

        /// Property value `name=value` (repeatable). Overrides random values
        #[arg(short, long = "prop", value_name = "NAME=VALUE")]
        props: Vec<String>,
    },

    /// Retrieve a page
    Get {
        /// page id
        page_id: String,
    },

    /// Archive a page
    Archive {
        /// page id
        page_id: String,
    },

    /// Retrieve a property value, formatted as text
    Property {
        /// page id
        page_id: String,

        /// property id (or name)
        property_id: String,

        /// Print the raw response instead of formatted text
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Copy the schema of this database instead of using the built-in schema
    #[arg(long, env = "NOTION_TEMPLATE_DATABASE_ID")]
    pub template_db: Option<String>,

    /// Number of random rows to write
    #[arg(long, default_value_t = 1)]
    pub rows: u32,

    /// Read back rows written by this run and print their property values
    #[arg(long)]
    pub read_back: bool,

    /// Query by a random select value and by a random word in a text column
    #[arg(long)]
    pub query: bool,

    /// Seed for the random generator
    #[arg(long)]
    pub seed: Option<u64>,
}

pub struct AppContext {
    pub client: NotionClient,
    pub output: Output,
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(resolve_output_format(&cli), cli.output.as_deref())?;
    let client = build_client(&cli)?;
    let verbose = cli.verbose;

    let ctx = AppContext { client, output };

    let result = match cli.command {
        Commands::Database(args) => database::handle(&ctx, args).await,
        Commands::Page(args) => page::handle(&ctx, args).await,
        Commands::Generate { database_id, count } => {
            generate::handle(&ctx, &database_id, count).await
        }
        Commands::Demo(args) => demo::handle(&ctx, args).await,
    };
    if verbose > 0 {
        info!("{}", ctx.client.http_metrics());
    }
    result
}

fn resolve_output_format(cli: &Cli) -> OutputFormat {
    if cli.quiet {
        OutputFormat::Quiet
    } else if cli.pretty {
        if cli.table {
            warn!("--pretty conflicts with --table. Using json pretty format");
        }
        OutputFormat::Pretty
    } else if cli.json {
        if cli.table {
            warn!("--json conflicts with --table. Using json format");
        }
        OutputFormat::Json
    } else if cli.table {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

fn build_client(cli: &Cli) -> Result<NotionClient> {
    let mut config = ClientConfig::default();
    if let Some(url) = &cli.url {
        config = config.base_url(url);
    }
    if let Some(token) = &cli.token {
        config = config.token(SecretToken::new(token.as_str()));
    }
    if let Some(root_page) = &cli.root_page {
        config = config.root_page_id(root_page);
    }
    let client = NotionClient::with_config(config)?;
    Ok(client)
}
