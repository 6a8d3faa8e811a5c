// ABOUTME: Creates destination schemas that a table-scoped restore needs
// ABOUTME: pg_dump -t emits no CREATE SCHEMA, so missing ones are added here

use crate::schema::{quote_ident, Reporter, Task};
use anyhow::{Context, Result};
use std::collections::HashSet;
use tokio_postgres::Client;

/// List the schemas currently present on a database.
pub async fn list_schemas(client: &Client) -> Result<HashSet<String>> {
    let rows = client
        .query("SELECT schema_name FROM information_schema.schemata", &[])
        .await
        .context("Failed to list destination schemas")?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Schemas referenced by the tasks that the destination does not have yet,
/// deduplicated and in ascending lexicographic order.
pub fn missing_schemas(tasks: &[Task], existing: &HashSet<String>) -> Vec<String> {
    let needed: HashSet<&str> = tasks
        .iter()
        .map(|task| task.schema.as_str())
        .filter(|schema| !existing.contains(*schema))
        .collect();

    let mut needed: Vec<String> = needed.into_iter().map(String::from).collect();
    needed.sort();
    needed
}

/// Create every missing schema on the destination, in sorted order.
///
/// This runs outside any transaction pg_restore may open later, so a failure
/// partway through can leave empty schemas behind on the destination. Known
/// limitation; not remediated here.
///
/// Returns the names that were created.
pub async fn provision_schemas(
    client: &Client,
    tasks: &[Task],
    existing: &HashSet<String>,
    reporter: &Reporter,
) -> Result<Vec<String>> {
    let needed = missing_schemas(tasks, existing);

    for schema in &needed {
        reporter.line(&format!("Creating schema {}", schema));
        let statement = format!("CREATE SCHEMA {}", quote_ident(schema));
        client
            .execute(&statement, &[])
            .await
            .with_context(|| format!("Failed to create schema '{}'", schema))?;
    }

    Ok(needed)
}
