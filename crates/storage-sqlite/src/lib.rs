//! SQLite storage implementation for Referra.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `referra-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the ledgers, registry, and directory
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies
//! exist. `core` is database-agnostic and works with traits.
//!
//! Writes are serialized through a single writer actor that runs every job
//! inside an immediate transaction; status updates additionally carry an
//! expected-status filter so lifecycle transitions are compare-and-set.
//! Reads go straight to the connection pool.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod campaigns;
pub mod referrals;
pub mod rewards;
pub mod selections;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from referra-core for convenience
pub use referra_core::errors::{DatabaseError, Error, Result};
