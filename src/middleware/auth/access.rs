//! access token（JWT）検証 → SecurityContext を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を TokenVerifier で検証し、成功時のみ Principal を載せる
//! - ここでは拒否しない。ヘッダなし・形式不正・検証失敗はすべて「未認証のまま次へ」
//! - 401/403 は handler 側の extractor (AuthCtxExtractor) が決める

use std::panic::{self, AssertUnwindSafe};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::{Principal, SecurityContext};
use crate::services::auth::{AccessJwtError, VerifyAccessToken};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request stayed unauthenticated. None of these reject the request.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("no authorization header")]
    MissingCredential,
    #[error("authorization header is not a bearer credential")]
    MalformedCredential,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    ExpiredToken,
    #[error("missing or invalid claim: {0}")]
    MissingClaim(&'static str),
    #[error("unexpected verification failure: {0}")]
    UnexpectedFailure(String),
}

impl AuthFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential => "malformed_credential",
            Self::InvalidSignature => "invalid_signature",
            Self::ExpiredToken => "expired_token",
            Self::MissingClaim(_) => "missing_claim",
            Self::UnexpectedFailure(_) => "unexpected_failure",
        }
    }
}

impl From<AccessJwtError> for AuthFailure {
    fn from(e: AccessJwtError) -> Self {
        match e {
            AccessJwtError::Malformed => Self::MalformedCredential,
            AccessJwtError::InvalidSignature => Self::InvalidSignature,
            AccessJwtError::Expired { .. } => Self::ExpiredToken,
            AccessJwtError::MissingClaim(name) | AccessJwtError::InvalidClaim(name) => {
                Self::MissingClaim(name)
            }
            AccessJwtError::Unexpected(e) => Self::UnexpectedFailure(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { user_id: i64 },
    // Token verified, but the context already held a principal; it was kept.
    AlreadyAuthenticated,
}

/// `/api/v1/*` に認証 filter を掛ける。
///
/// 例：
/// ```ignore
/// let v1 = Router::new().route("/me", get(me));
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    match authenticate(state.verifier.as_ref(), req.headers(), &mut ctx) {
        Ok(AuthOutcome::Authenticated { user_id }) => {
            tracing::debug!(user_id, "bearer token accepted");
        }
        Ok(AuthOutcome::AlreadyAuthenticated) => {
            tracing::debug!("security context already populated; keeping existing principal");
        }
        Err(AuthFailure::MissingCredential) => {
            tracing::trace!("no bearer credential; continuing unauthenticated");
        }
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "JWT authentication failed");
        }
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    next.run(req).await
}

/// One pass of the filter over a request's headers.
///
/// `ctx` only ever moves from empty to holding one principal; an existing principal is never replaced.
pub fn authenticate<V>(
    verifier: &V,
    headers: &HeaderMap,
    ctx: &mut SecurityContext,
) -> Result<AuthOutcome, AuthFailure>
where
    V: VerifyAccessToken + ?Sized,
{
    let token = bearer_token(headers)?;

    let claims = panic::catch_unwind(AssertUnwindSafe(|| verifier.verify(token)))
        .map_err(|_| AuthFailure::UnexpectedFailure("verifier panicked".to_string()))??;
    tracing::trace!(
        user_id = claims.user_id,
        issued_at = ?claims.issued_at,
        expires_at = %claims.expires_at,
        "token verified"
    );

    let principal = Principal::from(claims);
    let user_id = principal.user_id;

    match ctx.attach(principal) {
        Ok(()) => Ok(AuthOutcome::Authenticated { user_id }),
        Err(_) => Ok(AuthOutcome::AlreadyAuthenticated),
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthFailure::MissingCredential)?;

    let value = value
        .to_str()
        .map_err(|_| AuthFailure::MalformedCredential)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthFailure::MalformedCredential),
    }
}
