// ABOUTME: CLI entry point for pg-schema-sync
// ABOUTME: Parses options and runs the schema sync command

use clap::Parser;
use pg_schema_sync::commands::{self, SyncOptions};
use pg_schema_sync::schema::Task;

#[derive(Parser)]
#[command(name = "pg-schema-sync")]
#[command(about = "Sync a PostgreSQL schema (DDL only) from one database to another", long_about = None)]
#[command(version)]
struct Cli {
    /// Source database connection string
    #[arg(long)]
    source: String,
    /// Destination database connection string
    #[arg(long)]
    destination: String,
    /// Restrict the sync to these tables (format: schema.table, comma-separated)
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<String>>,
    /// Skip trigger definitions when restoring
    #[arg(long)]
    exclude_triggers: bool,
    /// Keep existing destination data (conflicts with schema sync; reported as an error)
    #[arg(long)]
    preserve: bool,
    /// Print the assembled pg_dump/pg_restore commands and stream all output
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let tasks: Vec<Task> = cli
        .tables
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|reference| Task::parse(reference))
        .collect();

    let opts = SyncOptions {
        table_scope: cli.tables.is_some(),
        tasks,
        exclude_triggers: cli.exclude_triggers,
        preserve: cli.preserve,
        debug: cli.debug,
    };

    commands::sync(&cli.source, &cli.destination, &opts).await
}
