use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::{DomainError, ProductId};

use crate::app::dto::{CreateProductRequest, ListProductsQuery, UpdateProductRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

fn parse_id(raw: &str) -> Result<ProductId, ApiError> {
    Ok(raw.parse::<ProductId>()?)
}

fn parse_query(
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<ListProductsQuery, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        DomainError::validation(
            "category",
            format!("invalid query string: {}", rejection.body_text()),
        )
    })?;
    Ok(query)
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let items = services.list_products(query.category.as_deref()).await?;
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = services.get_product(parse_id(&id)?).await?;
    Ok((StatusCode::OK, Json(product)).into_response())
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = CreateProductRequest::from_json(&body)?;
    let created = services.create_product(request.into_new_product()).await?;

    let location = format!("/products/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let request = UpdateProductRequest::from_json(&body)?;
    let updated = services.update_product(id, request.into_patch()).await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let deleted = services.delete_product(parse_id(&id)?).await?;
    Ok((StatusCode::OK, Json(deleted)).into_response())
}
