//! Database connection management.

pub mod connection;

pub use connection::{connect_pool, run_migrations};
