/// Factory: build `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenVerifier;
use crate::services::auth::access_jwt::VerifierOptions;
use crate::services::auth::key::KeyError;

pub fn build_token_verifier(config: &Config) -> Result<Arc<TokenVerifier>, KeyError> {
    let verifier = TokenVerifier::new(
        config.jwt_algorithm,
        &config.jwt_key,
        VerifierOptions {
            issuer: config.auth_issuer.clone(),
            audience: config.auth_audience.clone(),
            leeway_seconds: config.access_token_leeway_seconds,
        },
    )
    .inspect_err(|e| {
        tracing::warn!(error = %e, algorithm = ?config.jwt_algorithm, "failed to load access token key material");
    })?;

    Ok(Arc::new(verifier))
}
