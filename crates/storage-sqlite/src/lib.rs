//! SQLite storage implementation for Marketdeck.
//!
//! This crate provides all database-related functionality using Diesel with
//! SQLite. It implements the store traits defined in `marketdeck-core` and
//! contains:
//! - Connection pooling and pragma management
//! - Embedded Diesel migrations
//! - The single-writer actor all mutations flow through
//! - Repository implementations for instruments and prices
//!
//! This crate is the only place in the application where Diesel appears;
//! everything above it works with the core traits.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod instruments;
pub mod prices;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use instruments::InstrumentRepository;
pub use prices::PriceRepository;

// Re-export from marketdeck-core for convenience
pub use marketdeck_core::errors::{DatabaseError, Error, Result};
