// ABOUTME: Command implementations for the sync binary
// ABOUTME: Exports the schema sync command and its options

pub mod sync;

pub use sync::{sync, SyncOptions};
