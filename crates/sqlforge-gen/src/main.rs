//! sqlforge-gen CLI
//!
//! Parses annotated query folders against a live database and prints the
//! query descriptions as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlforge_gen::query::QueryFolder;
use sqlforge_gen::{Catalog, GenConfig, Parser, PgTypeResolver, Translator, TypeRegistry};

/// Type-checked query descriptions from annotated SQL files.
#[derive(ClapParser)]
#[command(name = "sqlforge-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PostgreSQL connection string.
    #[arg(short, long, env = "DATABASE_URL")]
    database: String,

    /// Configuration file (defaults to sqlforge.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the JSON output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Query folders; overrides the configured ones.
    folders: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Output {
    folders: Vec<QueryFolder>,
    types: TypeRegistry,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = GenConfig::load(cli.config.as_deref())?;
    let folders = if cli.folders.is_empty() {
        config.queries.clone()
    } else {
        cli.folders
    };
    anyhow::ensure!(!folders.is_empty(), "no query folders given");

    let pool = PgPoolOptions::new()
        .max_connections(u32::try_from(config.concurrency).unwrap_or(u32::MAX).max(1))
        .connect(&cli.database)
        .await
        .context("connecting to the database")?;

    let catalog = Catalog::load(&pool, &config.shared_schema).await?;
    let translator = Translator::new(&catalog, &config.shared_schema)
        .with_types(config.types)
        .with_overrides(config.type_overrides);
    let parser = Parser::new(catalog, config.shared_schema, translator, PgTypeResolver::new(pool))
        .with_concurrency(config.concurrency);

    let folders = parser.parse_folders(&folders).await?;
    let queries: usize = folders
        .iter()
        .flat_map(|f| &f.files)
        .map(|f| f.queries.len())
        .sum();
    info!(queries, "parsed all folders");

    let output = Output {
        folders,
        types: parser.translator().registry(),
    };
    let json = serde_json::to_string_pretty(&output)?;
    match cli.output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    Ok(())
}
