//! Postgres-backed product repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepoError |
//! |------------|-----------|
//! | `PoolClosed`, `PoolTimedOut`, `Io` | `Unavailable` |
//! | `Database` and everything else | `Database` (operation name + driver message) |
//!
//! Name uniqueness is not enforced here: the table carries no unique index on
//! `name`, so two concurrent inserts with the same name both succeed.

use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::{NewProduct, Product};

use super::r#trait::{ProductRepository, RepoError, RepoResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price NUMERIC NOT NULL
)
"#;

/// Postgres-backed product repository.
///
/// Uses the SQLx connection pool (`Send + Sync`, cheap to clone). Each method
/// runs a single statement on a pooled connection; there are no explicit
/// transactions.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it is missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self), err)]
    async fn list_all(&self) -> RepoResult<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, category, price FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_all", e))?;
        decode_rows("list_all", rows)
    }

    #[instrument(skip(self), err)]
    async fn list_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category, price
            FROM products
            WHERE category = $1
            ORDER BY id
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_by_category", e))?;
        decode_rows("list_by_category", rows)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let row = sqlx::query("SELECT id, name, category, price FROM products WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_by_id", e))?;
        row.map(|r| decode_row("get_by_id", &r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, price
            FROM products
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_name", e))?;
        row.map(|r| decode_row("find_by_name", &r)).transpose()
    }

    #[instrument(skip(self, product), fields(name = %product.name), err)]
    async fn create(&self, product: NewProduct) -> RepoResult<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, category, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, category, price
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;
        decode_row("create", &row)
    }

    #[instrument(skip(self, product), fields(id = %id), err)]
    async fn update(&self, id: ProductId, product: Product) -> RepoResult<Product> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, category = $3, price = $4
            WHERE id = $1
            RETURNING id, name, category, price
            "#,
        )
        .bind(id.get())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(r) => decode_row("update", &r),
            None => Err(RepoError::NotFound(id)),
        }
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, category, price
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?;
        row.map(|r| decode_row("delete", &r)).transpose()
    }
}

/// Map SQLx errors to RepoError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolClosed => {
            RepoError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            RepoError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(e) => RepoError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Database(db_err) => RepoError::database(operation, db_err.message()),
        other => RepoError::database(operation, other.to_string()),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    category: String,
    price: Decimal,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            price: row.price,
        }
    }
}

fn decode_row(operation: &'static str, row: &PgRow) -> RepoResult<Product> {
    ProductRow::from_row(row)
        .map(Product::from)
        .map_err(|e| RepoError::database(operation, format!("failed to decode product row: {e}")))
}

fn decode_rows(operation: &'static str, rows: Vec<PgRow>) -> RepoResult<Vec<Product>> {
    rows.iter().map(|r| decode_row(operation, r)).collect()
}
