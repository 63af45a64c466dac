use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use catalog_core::DomainError;
use catalog_infra::RepoError;

/// Error returned by product handlers.
///
/// Validation and conflict failures map to 400, missing resources to 404.
/// Store failures are not handled beyond a logged 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] RepoError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::NotFound) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Domain(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Domain(DomainError::Validation { .. }) => "validation_error",
            ApiError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            ApiError::Domain(DomainError::Conflict(_)) => "duplicate_name",
            ApiError::Domain(DomainError::NotFound) | ApiError::NotFound(_) => "not_found",
            ApiError::Store(RepoError::NotFound(_)) => "not_found",
            ApiError::Store(_) => "store_error",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::NotFound) | ApiError::Store(RepoError::NotFound(_)) => {
                "product not found".to_string()
            }
            // Store internals stay in the logs.
            ApiError::Store(_) => "internal store error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "product store failure");
        }
        json_error(status, self.code(), self.message())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
