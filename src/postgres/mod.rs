// ABOUTME: PostgreSQL utilities module
// ABOUTME: Exports connection management for destination provisioning

pub mod connection;

pub use connection::{connect, connect_with_retry};
