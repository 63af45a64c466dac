//! Infrastructure layer: product storage and configuration.

pub mod config;
pub mod repository;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use repository::{
    InMemoryProductRepository, PostgresProductRepository, ProductRepository, RepoError, RepoResult,
};
