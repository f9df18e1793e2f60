/*
 * Responsibility
 * - access token 検証用の鍵素材 (共有秘密 or 公開鍵 PEM) を保持する
 * - Algorithm と鍵素材の組み合わせから DecodingKey を組み立てる
 * - 鍵素材は Debug に出さない
 */
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

/// HS* で受け付ける共有秘密の最小長 (bytes)
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("shared secret must be at least {min} bytes, got {len}", min = MIN_SECRET_LEN)]
    WeakSecret { len: usize },
    #[error("{algorithm:?} requires a shared secret, got a public key")]
    ExpectedSecret { algorithm: Algorithm },
    #[error("{algorithm:?} requires a public key PEM, got a shared secret")]
    ExpectedPublicKey { algorithm: Algorithm },
    #[error("invalid public key pem for {algorithm:?}: {source}")]
    InvalidPem {
        algorithm: Algorithm,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

/// Startup-time key material. Immutable once loaded.
#[derive(Clone)]
pub enum KeyMaterial {
    Secret(Vec<u8>),
    PublicKeyPem(String),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret(_) => f.write_str("Secret(<redacted>)"),
            Self::PublicKeyPem(_) => f.write_str("PublicKeyPem(..)"),
        }
    }
}

pub fn is_symmetric(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

pub(crate) fn decoding_key(
    algorithm: Algorithm,
    material: &KeyMaterial,
) -> Result<DecodingKey, KeyError> {
    match (is_symmetric(algorithm), material) {
        (true, KeyMaterial::Secret(secret)) => {
            if secret.len() < MIN_SECRET_LEN {
                return Err(KeyError::WeakSecret { len: secret.len() });
            }
            Ok(DecodingKey::from_secret(secret))
        }
        (true, KeyMaterial::PublicKeyPem(_)) => Err(KeyError::ExpectedSecret { algorithm }),
        (false, KeyMaterial::Secret(_)) => Err(KeyError::ExpectedPublicKey { algorithm }),
        (false, KeyMaterial::PublicKeyPem(pem)) => {
            let pem = pem.as_bytes();
            let key = match algorithm {
                Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
                Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
                // RS* / PS*
                _ => DecodingKey::from_rsa_pem(pem),
            };
            key.map_err(|source| KeyError::InvalidPem { algorithm, source })
        }
    }
}
