// ABOUTME: Top-level schema sync command
// ABOUTME: Sequences provisioning, manifest filtering, and the dump|restore pipeline

use crate::error::SyncError;
use crate::postgres;
use crate::schema::{self, Endpoint, Reporter, Task};
use crate::utils;
use anyhow::Result;
use indicatif::ProgressBar;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

/// Options for one schema sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Tables selected for sync; drives `-t` selectors and schema provisioning.
    pub tasks: Vec<Task>,
    /// True when any table/schema/exclude filter narrowed the scope.
    pub table_scope: bool,
    /// Drop TRIGGER entries from the restore manifest.
    pub exclude_triggers: bool,
    /// Keep existing destination data. Incompatible with schema sync, which
    /// restores with --clean; accepted here so the conflict is reported
    /// instead of silently ignored.
    pub preserve: bool,
    /// Emit assembled commands and manifest lines to the log.
    pub debug: bool,
}

/// Sync the source database's schema (DDL only) to the destination.
///
/// Sequencing:
/// 1. Reject conflicting options before anything else runs
/// 2. Build the dump and restore commands (fails fast on missing tools)
/// 3. Start a spinner when attached to a terminal
/// 4. Provision missing destination schemas when a table scope is active
/// 5. Rewrite the restore manifest when trigger exclusion is requested
/// 6. Run the dump|restore pipeline
/// 7. Resolve the spinner; on failure flush any buffered output
///
/// # Errors
///
/// Returns [`SyncError::ConfigurationConflict`] for incompatible options,
/// [`SyncError::ToolNotFound`] when pg_dump or pg_restore is absent, and
/// [`SyncError::PipelineFailure`] when any pipeline stage exits non-zero.
pub async fn sync(source_url: &str, destination_url: &str, opts: &SyncOptions) -> Result<()> {
    // Conflicting options are rejected before any command is built and
    // before any external process starts.
    if opts.preserve {
        return Err(SyncError::ConfigurationConflict(
            "--preserve cannot be combined with schema sync".to_string(),
        )
        .into());
    }

    utils::validate_connection_string(source_url)?;
    utils::validate_connection_string(destination_url)?;
    utils::validate_source_destination_different(source_url, destination_url)?;

    // Build both commands up front so a missing or outdated tool fails
    // before the spinner starts.
    utils::check_required_tools()?;
    let if_exists = schema::restore_supports_if_exists().await?;

    let source = Endpoint::new(source_url);
    let mut destination = Endpoint::new(destination_url);

    let dump_command = schema::build_dump_command(&source, &opts.tasks, opts.table_scope);
    let restore_command = schema::build_restore_command(&destination, if_exists);

    let interactive = std::io::stderr().is_terminal();
    let reporter = Arc::new(Reporter::new(interactive, opts.debug));

    let spinner = if reporter.is_buffered() {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Syncing schema");
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    } else {
        tracing::info!("Syncing schema...");
        None
    };

    let result = run_phases(&mut destination, dump_command, restore_command, &reporter, opts).await;

    match &result {
        Ok(()) => {
            if let Some(bar) = &spinner {
                bar.finish_with_message("✓ Schema synced");
            } else {
                tracing::info!("✓ Schema synced");
            }
        }
        Err(_) => {
            if let Some(bar) = &spinner {
                bar.finish_with_message("✗ Schema sync failed");
            }
            // In buffered mode the captured output is only shown now, so the
            // underlying pg_dump/pg_restore error is diagnosable.
            reporter.flush();
        }
    }

    result
}

async fn run_phases(
    destination: &mut Endpoint,
    dump_command: Vec<String>,
    mut restore_command: Vec<String>,
    reporter: &Arc<Reporter>,
    opts: &SyncOptions,
) -> Result<()> {
    // A table-scoped dump emits no CREATE SCHEMA statements, so schemas the
    // selected tables live in must exist on the destination first.
    if opts.table_scope {
        let client = postgres::connect_with_retry(&destination.url).await?;
        destination.schemas = schema::list_schemas(&client).await?;
        let created =
            schema::provision_schemas(&client, &opts.tasks, &destination.schemas, reporter).await?;
        destination.schemas.extend(created);
    }

    // Trigger exclusion rewrites the restore manifest. The temp file handle
    // must stay alive across the pipeline run; pg_restore reads it by path.
    let manifest = if opts.exclude_triggers {
        let file = schema::write_filtered_manifest(&dump_command, reporter, opts.debug).await?;
        let at = restore_command.len() - 2; // keep -d <url> last
        restore_command.insert(at, "--use-list".to_string());
        restore_command.insert(at + 1, file.path().display().to_string());
        Some(file)
    } else {
        None
    };

    let success = schema::run_pipeline(&dump_command, &restore_command, reporter, opts.debug).await?;
    drop(manifest);

    if !success {
        return Err(SyncError::PipelineFailure.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preserve_conflict_rejected_before_anything_runs() {
        let opts = SyncOptions {
            preserve: true,
            ..Default::default()
        };
        // Invalid URLs on purpose: the conflict check must fire before
        // validation, tool probing, or any process spawn.
        let err = sync("not-a-url", "also-not-a-url", &opts).await.unwrap_err();

        match err.downcast_ref::<SyncError>() {
            Some(SyncError::ConfigurationConflict(msg)) => {
                assert!(msg.contains("--preserve"));
            }
            other => panic!("expected ConfigurationConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_same_source_and_destination_rejected() {
        let url = "postgresql://user@host:5432/db";
        let result = sync(url, url, &SyncOptions::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_connection_string_rejected() {
        let result = sync(
            "mysql://user@host/db",
            "postgresql://user@host:5432/db",
            &SyncOptions::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
