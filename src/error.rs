// ABOUTME: Domain error types for schema sync failures
// ABOUTME: Distinguishes config conflicts, missing tools, and pipeline exits

use thiserror::Error;

/// Fatal conditions for a single sync run. None of these are retried
/// internally; they propagate to the caller as-is.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Mutually exclusive options were requested together. Detected before
    /// any command is built or any external process starts.
    #[error("conflicting options: {0}")]
    ConfigurationConflict(String),

    /// A required client binary is not on PATH. Raised during command
    /// building, before any progress indicator starts.
    #[error("required tool not found: {0}. Install the PostgreSQL client tools (postgresql-client)")]
    ToolNotFound(String),

    /// One or more stages of a dump/restore pipeline exited non-zero. The
    /// captured output is surfaced before this is raised.
    #[error("schema sync pipeline failed (see output above for the pg_dump/pg_restore error)")]
    PipelineFailure,
}
