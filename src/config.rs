/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, JWT 鍵素材、issuer/audience、HTTP 制限など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::services::auth::key::{self, KeyMaterial};

/// `APP_ENV`; anything other than `production`/`prod` runs as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Startup fails on these; the key is the env var name.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// HTTP-level limits applied to every route.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub jwt_algorithm: Algorithm,
    // HS*: shared secret, others: public key PEM
    pub jwt_key: KeyMaterial,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,

    pub http: HttpConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env, map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let jwt_algorithm = match var("JWT_ALGORITHM") {
            Some(s) => Algorithm::from_str(s.trim())
                .map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))?,
            None => Algorithm::HS256,
        };

        let jwt_key = if key::is_symmetric(jwt_algorithm) {
            let secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
            KeyMaterial::Secret(secret.into_bytes())
        } else {
            let pem = var("ACCESS_JWT_PUBLIC_KEY_PEM")
                .ok_or(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?
                .replace("\\n", "\n");
            KeyMaterial::PublicKeyPem(pem)
        };

        let auth_issuer = var("AUTH_ISSUER");
        let auth_audience = var("AUTH_AUDIENCE");

        let access_token_leeway_seconds = parse_or("ACCESS_TOKEN_LEEWAY_SECONDS", &var, 0)?;

        let request_timeout_seconds = parse_or("REQUEST_TIMEOUT_SECONDS", &var, 30)?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }
        let body_limit_bytes = parse_or("REQUEST_BODY_LIMIT_BYTES", &var, 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            jwt_algorithm,
            jwt_key,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            http: HttpConfig {
                request_timeout: Duration::from_secs(request_timeout_seconds),
                body_limit_bytes,
            },
        })
    }
}

fn parse_or<T, F>(key: &'static str, var: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
