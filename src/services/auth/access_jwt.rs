use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

use crate::services::auth::key::{self, KeyError, KeyMaterial};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug, Error)]
pub enum AccessJwtError {
    #[error("token is not a compact JWS (header.payload.signature)")]
    Malformed,
    #[error("signature does not match the configured key")]
    InvalidSignature,
    #[error("token expired at {expires_at}")]
    Expired { expires_at: i64 },
    #[error("missing '{0}' claim")]
    MissingClaim(&'static str),
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
    #[error("jwt verification failed: {0}")]
    Unexpected(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => Self::Malformed,
            ErrorKind::Json(_) => Self::InvalidClaim("payload"),
            ErrorKind::ExpiredSignature => Self::Expired { expires_at: 0 },
            ErrorKind::MissingRequiredClaim(name) => Self::MissingClaim(claim_label(name)),
            ErrorKind::InvalidIssuer => Self::InvalidClaim("iss"),
            ErrorKind::InvalidAudience => Self::InvalidClaim("aud"),
            ErrorKind::ImmatureSignature => Self::InvalidClaim("nbf"),
            _ => Self::Unexpected(e),
        }
    }
}

fn claim_label(name: &str) -> &'static str {
    match name {
        "exp" => "exp",
        "iss" => "iss",
        "aud" => "aud",
        "sub" => "sub",
        "nbf" => "nbf",
        _ => "unknown",
    }
}

/// Access token (JWT) claims as they appear on the wire.
///
/// Everything is optional here so that absence surfaces as `MissingClaim`
/// rather than a generic deserialization error.
#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    // Integer or a string holding an integer.
    #[serde(default)]
    sub: serde_json::Value,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    // Diagnostic only; an odd value (float, string) is ignored rather than rejected.
    #[serde(default)]
    iat: serde_json::Value,
}

/// TokenVerifier が返す「検証済み・アプリ側で使う型」
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct VerifierOptions {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

/// Seam between the authentication filter and whatever checks the bearer token.
pub trait VerifyAccessToken: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, AccessJwtError>;
}

/// Access-token verifier over fixed key material.
///
/// - Holds no mutable state; share it behind an `Arc`.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        algorithm: Algorithm,
        material: &KeyMaterial,
        options: VerifierOptions,
    ) -> Result<Self, KeyError> {
        let decoding_key = key::decoding_key(algorithm, material)?;

        let mut validation = Validation::new(algorithm);
        // exp is checked up front in `verify_at`, before the signature.
        validation.validate_exp = false;
        validation.leeway = options.leeway_seconds;

        // A configured issuer/audience must also be present, not just match when present.
        let mut required = vec!["exp"];
        if let Some(issuer) = options.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match options.audience.as_deref() {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify a bearer token body against the current time.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, AccessJwtError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify + strict claim validation at a fixed instant (`now`, seconds since epoch).
    ///
    /// Order:
    /// - shape (three segments)
    /// - `exp` (`exp <= now` fails, regardless of the signature)
    /// - signature, algorithm, and `iss`/`aud` when configured (jsonwebtoken)
    /// - `sub`/`email`/`role` present and not empty
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedClaims, AccessJwtError> {
        let expires_at = unverified_exp(token)?;
        let leeway = i64::try_from(self.validation.leeway).unwrap_or(i64::MAX);
        if expires_at.saturating_add(leeway) <= now {
            return Err(AccessJwtError::Expired { expires_at });
        }

        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        let user_id = parse_subject(&claims.sub)?;
        let email = required_text(claims.email, "email")?;
        let role = required_text(claims.role, "role")?;

        Ok(VerifiedClaims {
            user_id,
            email,
            role,
            issued_at: claims
                .iat
                .as_i64()
                .and_then(|t| DateTime::from_timestamp(t, 0)),
            expires_at: DateTime::from_timestamp(expires_at, 0)
                .ok_or(AccessJwtError::InvalidClaim("exp"))?,
        })
    }
}

impl VerifyAccessToken for TokenVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, AccessJwtError> {
        TokenVerifier::verify(self, token)
    }
}

fn decode_segment(segment: &str) -> Result<serde_json::Value, AccessJwtError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AccessJwtError::Malformed)?;
    match serde_json::from_slice(&bytes) {
        Ok(value @ serde_json::Value::Object(_)) => Ok(value),
        _ => Err(AccessJwtError::Malformed),
    }
}

// Reads `exp` from the payload segment without checking the signature.
fn unverified_exp(token: &str) -> Result<i64, AccessJwtError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AccessJwtError::Malformed);
    };

    decode_segment(header)?;
    let payload = decode_segment(payload)?;

    match payload.get("exp") {
        None | Some(serde_json::Value::Null) => Err(AccessJwtError::MissingClaim("exp")),
        Some(exp) => exp
            .as_i64()
            .or_else(|| exp.as_f64().map(|f| f as i64))
            .ok_or(AccessJwtError::InvalidClaim("exp")),
    }
}

fn parse_subject(sub: &serde_json::Value) -> Result<i64, AccessJwtError> {
    match sub {
        serde_json::Value::Null => Err(AccessJwtError::MissingClaim("sub")),
        serde_json::Value::Number(n) => n.as_i64().ok_or(AccessJwtError::InvalidClaim("sub")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AccessJwtError::InvalidClaim("sub")),
        _ => Err(AccessJwtError::InvalidClaim("sub")),
    }
}

fn required_text(value: Option<String>, name: &'static str) -> Result<String, AccessJwtError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AccessJwtError::MissingClaim(name)),
    }
}
