// ABOUTME: Builds the pg_dump and pg_restore argument vectors for a sync run
// ABOUTME: Probes the installed pg_restore for --if-exists support

use crate::error::SyncError;
use crate::schema::{Endpoint, Task};
use anyhow::Result;
use tokio::process::Command;

/// Check whether the installed pg_restore understands `--if-exists`.
///
/// Older releases shipped a pg_restore without the flag, so the probe reads
/// the tool's own help text rather than guessing from version numbers. A
/// missing binary is a configuration error, distinct from an unsupported
/// flag, and surfaces as [`SyncError::ToolNotFound`].
pub async fn restore_supports_if_exists() -> Result<bool> {
    let output = Command::new("pg_restore")
        .arg("--help")
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::Error::new(SyncError::ToolNotFound("pg_restore".to_string()))
            } else {
                anyhow::Error::new(e).context("Failed to run pg_restore --help")
            }
        })?;

    Ok(help_advertises_if_exists(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

pub(crate) fn help_advertises_if_exists(help: &str) -> bool {
    help.contains("--if-exists")
}

/// Assemble the pg_dump invocation for a schema-only custom-format dump.
///
/// When a table scope is active, one `-t <quoted table>` pair is appended
/// per task, in task order. Callers are trusted to pass unique tasks; no
/// deduplication happens here.
pub fn build_dump_command(source: &Endpoint, tasks: &[Task], table_scope: bool) -> Vec<String> {
    let mut command: Vec<String> = [
        "pg_dump",
        "-Fc",
        "--schema-only",
        "--verbose",
        "--no-owner",
        "--no-acl",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if table_scope {
        for task in tasks {
            command.push("-t".to_string());
            command.push(task.quoted_table.clone());
        }
    }

    command.push("-d".to_string());
    command.push(source.url.clone());
    command
}

/// Assemble the pg_restore invocation. `--if-exists` is included only when
/// the capability probe reported support.
pub fn build_restore_command(destination: &Endpoint, if_exists: bool) -> Vec<String> {
    let mut command: Vec<String> = [
        "pg_restore",
        "--verbose",
        "--no-owner",
        "--no-acl",
        "--clean",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if if_exists {
        command.push("--if-exists".to_string());
    }

    command.push("-d".to_string());
    command.push(destination.url.clone());
    command
}
