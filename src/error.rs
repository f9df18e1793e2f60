/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 認証は filter 側では拒否しない。401/403 は extractor/handler 側の認可で返す
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,
    #[error("missing authority: {authority}")]
    Forbidden { authority: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
}

impl AppError {
    pub fn forbidden(authority: impl Into<String>) -> Self {
        Self::Forbidden {
            authority: authority.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            // The required authority is logged, not echoed back.
            AppError::Forbidden { authority } => {
                tracing::debug!(%authority, "access denied");
                (StatusCode::FORBIDDEN, "FORBIDDEN")
            }
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };

        let message = match &self {
            AppError::Forbidden { .. } => "forbidden".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}
