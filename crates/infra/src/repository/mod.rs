//! Product repository boundary.
//!
//! A thin data-access layer: every operation is one store call that commits on
//! its own. Nothing here spans operations in a transaction, so callers doing
//! check-then-write (e.g. name uniqueness) can race with each other.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
pub use r#trait::{ProductRepository, RepoError, RepoResult};
