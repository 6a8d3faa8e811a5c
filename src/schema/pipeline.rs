// ABOUTME: Runs the dump|restore process pipeline and aggregates exit status
// ABOUTME: Child stderr is drained on background tasks to avoid pipe stalls

use crate::schema::Reporter;
use anyhow::{Context, Result};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Forward every line of a child stream to the reporter as it arrives.
///
/// Each active pipe gets its own drain task so a chatty child can never fill
/// its OS buffer and block while the coordinator is waiting elsewhere.
pub(crate) fn drain_lines<R>(stream: R, reporter: Arc<Reporter>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            reporter.line(&line);
        }
    })
}

/// Run `producer | consumer` with both stderr streams drained concurrently.
///
/// The producer's stdout is wired into the consumer's stdin at the OS level;
/// none of the dump passes through this process. Returns true only if every
/// stage exited with status zero. Drain tasks are joined before the result
/// is computed so no buffered stderr is lost on failure.
pub async fn run_pipeline(
    producer: &[String],
    consumer: &[String],
    reporter: &Arc<Reporter>,
    debug: bool,
) -> Result<bool> {
    if debug {
        reporter.line(&producer.join(" "));
        reporter.line(&consumer.join(" "));
    }

    let mut producer_child = Command::new(&producer[0])
        .args(&producer[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", producer[0]))?;

    let producer_stdout = producer_child
        .stdout
        .take()
        .context("producer stdout was not captured")?;
    let producer_stderr = producer_child
        .stderr
        .take()
        .context("producer stderr was not captured")?;

    let consumer_stdin: Stdio = producer_stdout
        .try_into()
        .context("Failed to wire producer output into consumer input")?;

    let mut consumer_child = Command::new(&consumer[0])
        .args(&consumer[1..])
        .stdin(consumer_stdin)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", consumer[0]))?;

    let consumer_stderr = consumer_child
        .stderr
        .take()
        .context("consumer stderr was not captured")?;

    let drains = [
        drain_lines(producer_stderr, Arc::clone(reporter)),
        drain_lines(consumer_stderr, Arc::clone(reporter)),
    ];

    let producer_status = producer_child
        .wait()
        .await
        .with_context(|| format!("Failed to wait for {}", producer[0]))?;
    let consumer_status = consumer_child
        .wait()
        .await
        .with_context(|| format!("Failed to wait for {}", consumer[0]))?;

    // Unread stderr must be fully forwarded before success is decided.
    for drain in drains {
        let _ = drain.await;
    }

    Ok(producer_status.success() && consumer_status.success())
}
