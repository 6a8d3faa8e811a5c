// ABOUTME: Routes captured pipeline output to the log sink
// ABOUTME: Streams lines immediately, or buffers and flushes only on failure

use std::sync::Mutex;

/// Destination for every line the sync captures from its child processes.
///
/// The mode is fixed once at the start of a run. Non-interactive (or debug)
/// runs stream each line to the log as it arrives; interactive runs hide the
/// lines behind a spinner and only show them if the pipeline fails. On
/// success a buffered run never prints any captured output.
#[derive(Debug)]
pub enum Reporter {
    Streaming,
    Buffered { lines: Mutex<Vec<String>> },
}

impl Reporter {
    pub fn new(interactive: bool, debug: bool) -> Self {
        if interactive && !debug {
            Reporter::Buffered {
                lines: Mutex::new(Vec::new()),
            }
        } else {
            Reporter::Streaming
        }
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self, Reporter::Buffered { .. })
    }

    /// Record one captured line, preserving arrival order.
    pub fn line(&self, line: &str) {
        match self {
            Reporter::Streaming => tracing::info!("{}", line),
            Reporter::Buffered { lines } => lines.lock().unwrap().push(line.to_string()),
        }
    }

    /// Emit everything held back by buffered mode, in arrival order. No-op
    /// when streaming, where lines were already visible as they arrived.
    pub fn flush(&self) {
        if let Reporter::Buffered { lines } = self {
            for line in lines.lock().unwrap().iter() {
                tracing::info!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        assert!(Reporter::new(true, false).is_buffered());
        assert!(!Reporter::new(false, false).is_buffered());
        // Debug forces streaming even on a terminal
        assert!(!Reporter::new(true, true).is_buffered());
    }

    #[test]
    fn test_buffered_accumulates_in_arrival_order() {
        let reporter = Reporter::new(true, false);
        reporter.line("first");
        reporter.line("second");
        reporter.line("third");

        match &reporter {
            Reporter::Buffered { lines } => {
                assert_eq!(*lines.lock().unwrap(), vec!["first", "second", "third"]);
            }
            Reporter::Streaming => panic!("expected buffered mode"),
        }
    }

    #[test]
    fn test_flush_is_safe_in_both_modes() {
        let buffered = Reporter::new(true, false);
        buffered.line("kept until failure");
        buffered.flush();

        let streaming = Reporter::new(false, false);
        streaming.line("already visible");
        streaming.flush();
    }
}
