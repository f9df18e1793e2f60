/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer 認証 filter は v1 全体に掛ける (拒否はしない、主体を載せるだけ)
 * - 認可 (401/403) は各 handler の extractor で決める
 */
use axum::{Router, routing::get};

use crate::middleware::auth::access;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    me::{admin_ping, me},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/admin/ping", get(admin_ping));

    access::apply(router, state)
}
