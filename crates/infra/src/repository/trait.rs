use std::sync::Arc;

use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::{NewProduct, Product};

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation error.
///
/// These are **infrastructure errors** as opposed to domain errors: the
/// endpoint layer does not handle them beyond turning them into a 500.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The row targeted by an update no longer exists.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The store rejected or failed a query.
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// The store cannot be reached (closed pool, poisoned lock, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn database(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Database {
            operation,
            message: message.into(),
        }
    }
}

/// Data-access contract for products.
///
/// ## Semantics
///
/// - `list_all` makes no ordering promise; the bundled implementations return id order.
/// - `list_by_category` and `find_by_name` compare strings exactly.
/// - `create` lets the store assign the id and returns the stored entity.
/// - `update` persists an entity the caller has already mutated (last write wins).
/// - `delete` returns the removed entity, or `None` when the id was absent.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_all(&self) -> RepoResult<Vec<Product>>;

    async fn list_by_category(&self, category: &str) -> RepoResult<Vec<Product>>;

    async fn get_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;

    /// First product whose name equals `name`, if any.
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>>;

    async fn create(&self, product: NewProduct) -> RepoResult<Product>;

    /// Persist `product` under `id`.
    ///
    /// Returns `RepoError::NotFound` if the row was removed after the caller loaded it.
    async fn update(&self, id: ProductId, product: Product) -> RepoResult<Product>;

    async fn delete(&self, id: ProductId) -> RepoResult<Option<Product>>;
}

#[async_trait::async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn list_all(&self) -> RepoResult<Vec<Product>> {
        (**self).list_all().await
    }

    async fn list_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        (**self).list_by_category(category).await
    }

    async fn get_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        (**self).get_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        (**self).find_by_name(name).await
    }

    async fn create(&self, product: NewProduct) -> RepoResult<Product> {
        (**self).create(product).await
    }

    async fn update(&self, id: ProductId, product: Product) -> RepoResult<Product> {
        (**self).update(id, product).await
    }

    async fn delete(&self, id: ProductId) -> RepoResult<Option<Product>> {
        (**self).delete(id).await
    }
}
