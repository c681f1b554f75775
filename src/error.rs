use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::routes::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Profile not found")]
    NotFound,

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Validation error")]
    Validation(Vec<String>),

    #[error("Server error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Storage(Box::new(e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(Box::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MalformedPayload | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Storage(ref source) = self {
            error!("Storage failure: {source}");
        }

        let errors = match &self {
            AppError::Validation(violations) => Some(violations.clone()),
            _ => None,
        };

        (status, Json(ApiResponse::<()>::failure(self.to_string(), errors))).into_response()
    }
}
