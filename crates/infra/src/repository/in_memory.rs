use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use catalog_core::ProductId;
use catalog_products::{NewProduct, Product};

use super::r#trait::{ProductRepository, RepoError, RepoResult};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<ProductId, Product>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory product store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused, mirroring a
/// serial primary key. The lock is only held for the duration of one call.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<Table>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with `products`, assigning ids in order.
    pub fn with_products(products: impl IntoIterator<Item = NewProduct>) -> Self {
        let mut table = Table::default();
        for new in products {
            let id = ProductId::new(table.next_id);
            table.next_id += 1;
            table.rows.insert(id, new.into_product(id));
        }
        Self {
            table: RwLock::new(table),
        }
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Table>> {
        self.table
            .read()
            .map_err(|_| RepoError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Table>> {
        self.table
            .write()
            .map_err(|_| RepoError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> RepoResult<Vec<Product>> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn list_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        Ok(self
            .read()?
            .rows
            .values()
            .filter(|p| p.in_category(category))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        Ok(self.read()?.rows.values().find(|p| p.has_name(name)).cloned())
    }

    async fn create(&self, product: NewProduct) -> RepoResult<Product> {
        let mut table = self.write()?;
        let id = ProductId::new(table.next_id);
        table.next_id += 1;

        let stored = product.into_product(id);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: ProductId, mut product: Product) -> RepoResult<Product> {
        let mut table = self.write()?;
        let row = table.rows.get_mut(&id).ok_or(RepoError::NotFound(id))?;

        product.id = id;
        *row = product.clone();
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> RepoResult<Option<Product>> {
        Ok(self.write()?.rows.remove(&id))
    }
}
