/*
 * Responsibility
 * - GET /me: 認証済み主体を返す (未認証なら extractor が 401)
 * - GET /admin/ping: ROLE_ADMIN を要求 (なければ 403)
 */
use axum::Json;
use serde_json::{Value, json};

use crate::{
    api::v1::{dto::me::MeResponse, extractors::AuthCtxExtractor},
    error::AppError,
};

pub const ADMIN_AUTHORITY: &str = "ROLE_ADMIN";

pub async fn me(AuthCtxExtractor(principal): AuthCtxExtractor) -> Json<MeResponse> {
    Json(principal.into())
}

pub async fn admin_ping(auth: AuthCtxExtractor) -> Result<Json<Value>, AppError> {
    auth.require_authority(ADMIN_AUTHORITY)?;
    Ok(Json(json!({"status": "ok", "user_id": auth.0.user_id})))
}
