//! # Folio Infrastructure
//!
//! Concrete implementations of the repository ports defined in `folio-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL storage via SeaORM
//! - `minimal` - No external dependencies, in-memory only

pub mod database;
pub mod memory;

pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::PostgresStore;
