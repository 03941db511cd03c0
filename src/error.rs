//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::billing::BillingError;
use crate::store::StoreError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            // Billing failures are re-prompt material for the counter, not
            // server faults.
            AppError::Billing(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.code(), err.to_string())
            }
            AppError::Store(err) => {
                tracing::error!("store error: {}", err);
                (StatusCode::BAD_GATEWAY, "store_error", "document store request failed".to_string())
            }
            AppError::Template(err) => {
                tracing::error!("template error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "template_error", "template error".to_string())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error".to_string())
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
