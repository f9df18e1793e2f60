pub mod access_jwt;
pub mod authorities;
pub mod factory;
pub mod key;

#[cfg(test)]
pub(crate) mod testing;

pub use access_jwt::{AccessJwtError, TokenVerifier, VerifiedClaims, VerifyAccessToken};
pub use factory::build_token_verifier;
