//! # Folio Core
//!
//! The domain layer of Folio: entities, the visibility rules deciding which
//! posts a viewer may see, feed composition and pagination.
//! This crate has no infrastructure dependencies; storage is reached through
//! the repository ports in [`ports`].

pub mod authorship;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod service;
pub mod visibility;

pub use error::{DomainError, RepoError};
pub use service::Blog;
