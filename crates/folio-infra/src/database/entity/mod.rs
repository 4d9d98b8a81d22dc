//! SeaORM entities mirroring the `folio-core` domain types.

pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod user;
