//! PostgreSQL source
//!
//! Samples user tables through a `deadpool-postgres` pool.

pub mod adapter;
pub mod client;

pub use adapter::PostgresSource;
pub use client::PostgresClient;
