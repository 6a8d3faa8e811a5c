// ABOUTME: Schema sync engine module
// ABOUTME: Exports command building, provisioning, manifest filtering, and pipeline execution

pub mod command;
pub mod manifest;
pub mod pipeline;
pub mod provision;
pub mod report;

pub use command::{build_dump_command, build_restore_command, restore_supports_if_exists};
pub use manifest::write_filtered_manifest;
pub use pipeline::run_pipeline;
pub use provision::{list_schemas, missing_schemas, provision_schemas};
pub use report::Reporter;

use std::collections::HashSet;

/// A table selected for schema sync: the schema that qualifies it plus an
/// identifier already quoted for use as a pg_dump `-t` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub schema: String,
    pub quoted_table: String,
}

impl Task {
    /// Build a task from `table` or `schema.table`. A bare table name lands
    /// in `public`.
    pub fn parse(reference: &str) -> Self {
        let (schema, table) = match reference.split_once('.') {
            Some((schema, table)) => (schema, table),
            None => ("public", reference),
        };
        Task {
            schema: schema.to_string(),
            quoted_table: format!("{}.{}", quote_ident(schema), quote_ident(table)),
        }
    }
}

/// Quote a PostgreSQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// One side of the sync: a connection URL plus the schemas known to exist
/// there. The destination's set is refreshed after provisioning.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub schemas: HashSet<String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Endpoint {
            url: url.into(),
            schemas: HashSet::new(),
        }
    }
}
