/*
 * Responsibility
 * - GET /health (疎通用)
 * - 認証 filter は通るが、主体の有無は見ない
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
