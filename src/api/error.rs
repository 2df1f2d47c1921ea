use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("payload invalid: {0}")]
    InvalidPayload(String),
    #[error("attachment too large: {0} bytes")]
    PayloadTooLarge(usize),
    #[error("unknown project key: {0}")]
    UnknownProject(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnknownProject(_) => StatusCode::NOT_FOUND,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::UnknownProject(_) => "PROJECT_NOT_FOUND",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();
        let body = ErrorResponse {
            code: self.code(),
            message: message.clone(),
            error: message,
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<crate::ledger::LedgerError> for ApiError {
    fn from(value: crate::ledger::LedgerError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(value: crate::storage::StorageError) -> Self {
        ApiError::Internal(value.to_string())
    }
}
