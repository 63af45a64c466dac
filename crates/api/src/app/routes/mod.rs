use axum::{routing::get, Router};

pub mod products;
pub mod system;

/// Router for the product endpoints.
///
/// The collection answers on both `/products` and `/products/`.
pub fn router() -> Router {
    Router::new()
        .route(
            "/products/",
            get(products::list_products).post(products::create_product),
        )
        .nest("/products", products::router())
}
