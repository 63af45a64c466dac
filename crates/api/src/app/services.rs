use std::sync::Arc;

use anyhow::Context;

use catalog_core::{DomainError, Entity, ProductId};
use catalog_infra::{
    AppConfig, InMemoryProductRepository, PostgresProductRepository, ProductRepository,
    StoreBackend,
};
use catalog_products::{NewProduct, Product, ProductPatch};

use crate::app::errors::ApiError;

pub const DUPLICATE_NAME_MESSAGE: &str = "Product with provided name already exists.";
pub const EMPTY_CATEGORY_MESSAGE: &str = "No Product of the provided category was found";

/// Product use cases on top of an injected repository.
///
/// Each operation runs: business check → repository call. The name-uniqueness
/// check and the write that follows are separate store calls, so two
/// concurrent requests can both pass the check.
#[derive(Clone)]
pub struct AppServices {
    products: Arc<dyn ProductRepository>,
}

impl AppServices {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Services backed by an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductRepository::new()))
    }

    /// All products, or the products of one category.
    ///
    /// A category filter with no matches is a `NotFound`.
    pub async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let Some(category) = category else {
            return Ok(self.products.list_all().await?);
        };

        let items = self.products.list_by_category(category).await?;
        if items.is_empty() {
            return Err(ApiError::NotFound(EMPTY_CATEGORY_MESSAGE));
        }
        Ok(items)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(ApiError::Domain(DomainError::NotFound))
    }

    pub async fn create_product(&self, new: NewProduct) -> Result<Product, ApiError> {
        if self.products.find_by_name(&new.name).await?.is_some() {
            tracing::info!(name = %new.name, "create rejected: duplicate name");
            return Err(DomainError::conflict(DUPLICATE_NAME_MESSAGE).into());
        }

        let created = self.products.create(new).await?;
        tracing::info!(id = %created.id, "product created");
        Ok(created)
    }

    /// Apply `patch` to product `id`.
    ///
    /// The name check runs before the existence check, and ignores the target's
    /// own current name.
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ApiError> {
        if patch.is_empty() {
            tracing::debug!(%id, "update carries no fields");
        }

        if let Some(name) = patch.name.as_deref() {
            if let Some(existing) = self.products.find_by_name(name).await? {
                if existing.id() != id {
                    tracing::info!(%id, name, "update rejected: duplicate name");
                    return Err(DomainError::conflict(DUPLICATE_NAME_MESSAGE).into());
                }
            }
        }

        let mut product = self
            .products
            .get_by_id(id)
            .await?
            .ok_or(ApiError::Domain(DomainError::NotFound))?;

        product.apply_patch(&patch);
        let updated = self.products.update(id, product).await?;
        tracing::info!(%id, "product updated");
        Ok(updated)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let deleted = self
            .products
            .delete(id)
            .await?
            .ok_or(ApiError::Domain(DomainError::NotFound))?;
        tracing::info!(%id, "product deleted");
        Ok(deleted)
    }
}

/// Wire the repository selected by `config`.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("using in-memory product store; data is lost on restart");
            Ok(AppServices::in_memory())
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let repo = PostgresProductRepository::connect(database_url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;
            repo.ensure_schema()
                .await
                .context("failed to prepare products table")?;
            tracing::info!(max_connections, "using Postgres product store");
            Ok(AppServices::new(Arc::new(repo)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_infra::{RepoError, RepoResult};
    use rust_decimal::Decimal;

    fn services_with(names: &[(&str, &str)]) -> AppServices {
        let repo = InMemoryProductRepository::with_products(
            names
                .iter()
                .map(|(name, category)| NewProduct::new(*name, *category, Decimal::new(100, 0))),
        );
        AppServices::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn duplicate_name_on_create_leaves_store_unchanged() {
        let svc = services_with(&[("Hammer", "tools")]);
        let err = svc
            .create_product(NewProduct::new("Hammer", "other", Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Conflict(_))));
        assert_eq!(svc.list_products(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_name() {
        let svc = services_with(&[("Hammer", "tools")]);
        let patch = ProductPatch {
            name: Some("Hammer".to_string()),
            price: Some(Decimal::new(42, 0)),
            ..ProductPatch::default()
        };
        let updated = svc.update_product(ProductId::new(1), patch).await.unwrap();
        assert_eq!(updated.price, Decimal::new(42, 0));
    }

    #[tokio::test]
    async fn update_rejects_another_products_name() {
        let svc = services_with(&[("Hammer", "tools"), ("Saw", "tools")]);
        let patch = ProductPatch {
            name: Some("Saw".to_string()),
            ..ProductPatch::default()
        };
        let err = svc.update_product(ProductId::new(1), patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Conflict(_))));
        let hammer = svc.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(hammer.name, "Hammer");
    }

    #[tokio::test]
    async fn name_conflict_is_reported_before_missing_target() {
        let svc = services_with(&[("Hammer", "tools")]);
        let patch = ProductPatch {
            name: Some("Hammer".to_string()),
            ..ProductPatch::default()
        };
        let err = svc.update_product(ProductId::new(99), patch).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn empty_update_leaves_product_unchanged() {
        let svc = services_with(&[("Hammer", "tools")]);
        let before = svc.get_product(ProductId::new(1)).await.unwrap();
        let after = svc
            .update_product(ProductId::new(1), ProductPatch::default())
            .await
            .unwrap();
        assert_eq!(after, before);

        let err = svc
            .update_product(ProductId::new(9), ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn empty_category_filter_is_not_found() {
        let svc = services_with(&[("Hammer", "tools")]);
        let err = svc.list_products(Some("food")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(EMPTY_CATEGORY_MESSAGE)));
    }

    struct FailingRepository;

    #[async_trait::async_trait]
    impl ProductRepository for FailingRepository {
        async fn list_all(&self) -> RepoResult<Vec<Product>> {
            Err(RepoError::Unavailable("down".to_string()))
        }
        async fn list_by_category(&self, _category: &str) -> RepoResult<Vec<Product>> {
            Err(RepoError::Unavailable("down".to_string()))
        }
        async fn get_by_id(&self, _id: ProductId) -> RepoResult<Option<Product>> {
            Err(RepoError::Unavailable("down".to_string()))
        }
        async fn find_by_name(&self, _name: &str) -> RepoResult<Option<Product>> {
            Err(RepoError::Unavailable("down".to_string()))
        }
        async fn create(&self, _product: NewProduct) -> RepoResult<Product> {
            Err(RepoError::Unavailable("down".to_string()))
        }
        async fn update(&self, id: ProductId, _product: Product) -> RepoResult<Product> {
            Err(RepoError::NotFound(id))
        }
        async fn delete(&self, _id: ProductId) -> RepoResult<Option<Product>> {
            Err(RepoError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failures_propagate_unhandled() {
        let svc = AppServices::new(Arc::new(FailingRepository));
        let err = svc.list_products(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Store(RepoError::Unavailable(_))));

        let err = svc
            .create_product(NewProduct::new("A", "b", Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }
}
