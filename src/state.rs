/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: verifier: TokenVerifier (不変の鍵素材のみ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエスト単位の状態 (SecurityContext) はここに置かない
 */
use std::sync::Arc;

use crate::services::auth::TokenVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}
