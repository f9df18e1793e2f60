use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::{Principal, SecurityContext};

fn principal_from(parts: &Parts) -> Option<Principal> {
    parts
        .extensions
        .get::<SecurityContext>()
        .and_then(|ctx| ctx.principal())
        .cloned()
}

/// Handler で、認証済み Principal を受け取るための extractor
/// access middleware が SecurityContext を request.extensions() に insert 済みである前提
/// 主体がいない場合は 401 を返す（トークンなし・検証失敗・ミドルウェア未設定）
pub struct AuthCtxExtractor(pub Principal);

impl AuthCtxExtractor {
    /// 403 unless the principal holds `authority`.
    pub fn require_authority(&self, authority: &str) -> Result<(), AppError> {
        if self.0.has_authority(authority) {
            Ok(())
        } else {
            Err(AppError::forbidden(authority))
        }
    }
}

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from(parts)
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

/// 認証は任意のエンドポイント用。拒否はしない
pub struct MaybeAuthCtx(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeAuthCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthCtx(principal_from(parts)))
    }
}
