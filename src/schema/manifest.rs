// ABOUTME: Builds the filtered restore manifest used for trigger exclusion
// ABOUTME: pg_dump | pg_restore -l, with TRIGGER entries dropped from the listing

use crate::error::SyncError;
use crate::schema::pipeline::drain_lines;
use crate::schema::Reporter;
use anyhow::{Context, Result};
use std::io::Write;
use std::process::Stdio;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Keep every listing line except those tagged as a TRIGGER entry. The rest
/// of the line format is owned by pg_restore and passed through untouched.
pub(crate) fn keep_manifest_line(line: &str) -> bool {
    !line.contains("TRIGGER")
}

/// Produce a manifest file for `pg_restore --use-list` that omits triggers.
///
/// Runs the dump piped into a `pg_restore -l` listing, drops TRIGGER lines,
/// and writes the survivors verbatim to a fresh temp file. The file is
/// flushed before returning because pg_restore reopens it by path. Dropping
/// the returned handle deletes the file, failure paths included.
///
/// Listing stderr is forwarded to the reporter as it arrives; the listing
/// stdout is forwarded only in debug mode. Both external stages must exit
/// zero or the phase fails with [`SyncError::PipelineFailure`].
pub async fn write_filtered_manifest(
    dump_command: &[String],
    reporter: &Arc<Reporter>,
    debug: bool,
) -> Result<NamedTempFile> {
    let mut dump = Command::new(&dump_command[0])
        .args(&dump_command[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", dump_command[0]))?;

    let dump_stdout = dump.stdout.take().context("dump stdout was not captured")?;
    let dump_stderr = dump.stderr.take().context("dump stderr was not captured")?;

    let listing_stdin: Stdio = dump_stdout
        .try_into()
        .context("Failed to wire dump output into the listing stage")?;

    let mut listing = Command::new("pg_restore")
        .arg("-l")
        .stdin(listing_stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to spawn pg_restore -l")?;

    let listing_stdout = listing
        .stdout
        .take()
        .context("listing stdout was not captured")?;
    let listing_stderr = listing
        .stderr
        .take()
        .context("listing stderr was not captured")?;

    let drains = [
        drain_lines(dump_stderr, Arc::clone(reporter)),
        drain_lines(listing_stderr, Arc::clone(reporter)),
    ];

    let mut manifest = NamedTempFile::new().context("Failed to create manifest temp file")?;
    let mut lines = BufReader::new(listing_stdout).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read manifest listing")?
    {
        if debug {
            reporter.line(&line);
        }
        if keep_manifest_line(&line) {
            writeln!(manifest, "{}", line).context("Failed to write manifest temp file")?;
        }
    }
    // pg_restore reopens the manifest by path; it must be on disk, not in a
    // writer buffer.
    manifest.flush().context("Failed to flush manifest temp file")?;

    let dump_status = dump
        .wait()
        .await
        .with_context(|| format!("Failed to wait for {}", dump_command[0]))?;
    let listing_status = listing
        .wait()
        .await
        .context("Failed to wait for pg_restore -l")?;

    for drain in drains {
        let _ = drain.await;
    }

    if !(dump_status.success() && listing_status.success()) {
        return Err(SyncError::PipelineFailure.into());
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{build_dump_command, Endpoint};

    #[test]
    fn test_trigger_lines_are_dropped() {
        assert!(!keep_manifest_line(
            "2113; 2620 16405 TRIGGER public users audit_trigger owner"
        ));
        assert!(keep_manifest_line(
            "214; 1259 16396 TABLE public users owner"
        ));
        assert!(keep_manifest_line(";"));
        assert!(keep_manifest_line(""));
    }

    #[test]
    fn test_non_trigger_lines_preserved_in_order() {
        let listing = [
            ";",
            "; Archive created at 2026-08-27",
            "214; 1259 16396 TABLE public users owner",
            "2113; 2620 16405 TRIGGER public users audit owner",
            "215; 1259 16400 TABLE public orders owner",
            "2114; 2620 16406 TRIGGER public orders audit owner",
            "2205; 2606 16410 CONSTRAINT public orders orders_pkey owner",
        ];

        let kept: Vec<&&str> = listing.iter().filter(|l| keep_manifest_line(l)).collect();
        assert_eq!(kept.len(), 5);
        assert!(kept.iter().all(|l| !l.contains("TRIGGER")));
        assert_eq!(*kept[2], "214; 1259 16396 TABLE public users owner");
        assert_eq!(*kept[3], "215; 1259 16400 TABLE public orders owner");
    }

    #[tokio::test]
    #[ignore]
    async fn test_filtered_manifest_has_no_triggers() {
        // Requires a source database and the PostgreSQL client tools
        let url = std::env::var("TEST_SOURCE_URL").unwrap();

        let source = Endpoint::new(url);
        let dump_command = build_dump_command(&source, &[], false);
        let reporter = Arc::new(Reporter::Streaming);

        let manifest = write_filtered_manifest(&dump_command, &reporter, false)
            .await
            .unwrap();

        let content = std::fs::read_to_string(manifest.path()).unwrap();
        assert!(!content.is_empty());
        assert!(!content.lines().any(|line| line.contains("TRIGGER")));

        // The temp file disappears with the handle
        let path = manifest.path().to_path_buf();
        drop(manifest);
        assert!(!path.exists());
    }
}
