use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pricecheck_catalog::{PriceCheckError, Suggestion, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    PriceCheck(#[from] PriceCheckError),

    #[error("Invalid query string: {}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::PriceCheck(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<&'a [Suggestion]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, suggestions) = match &self {
            ApiError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::PriceCheck(e) => match e {
                PriceCheckError::Validation(_) => (StatusCode::BAD_REQUEST, None),
                PriceCheckError::Unresolved { suggestions, .. } => {
                    (StatusCode::NOT_FOUND, Some(suggestions.as_slice()))
                }
                PriceCheckError::NotFound { .. } => (StatusCode::NOT_FOUND, None),
                PriceCheckError::CatalogUnavailable { .. }
                | PriceCheckError::UnusableRate { .. } => (StatusCode::SERVICE_UNAVAILABLE, None),
                PriceCheckError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            },
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
            suggestions,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
