// ABOUTME: Library module for pg-schema-sync
// ABOUTME: Exports the schema sync engine for use in binary and tests

pub mod commands;
pub mod error;
pub mod postgres;
pub mod schema;
pub mod utils;
