//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scribe_core::domain::Role;
use scribe_core::ports::{AuthError, TokenClaims, TokenKind, TokenPayload, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiration_secs: i64,
    pub refresh_secret: String,
    pub refresh_expiration_secs: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEFAULT_SECRET.to_string(),
            access_expiration_secs: 900,
            refresh_secret: DEFAULT_SECRET.to_string(),
            refresh_expiration_secs: 604_800,
            issuer: "scribe-api".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = |key: &str| {
            let value = std::env::var(key).unwrap_or_else(|_| DEFAULT_SECRET.to_string());
            if value == DEFAULT_SECRET {
                warn_default_secret(key);
            }
            value
        };
        let seconds = |key: &str, fallback: i64| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            access_secret: secret("JWT_ACCESS_TOKEN_SECRET"),
            access_expiration_secs: seconds(
                "JWT_ACCESS_TOKEN_EXPIRATION_TIME",
                defaults.access_expiration_secs,
            ),
            refresh_secret: secret("JWT_REFRESH_TOKEN_SECRET"),
            refresh_expiration_secs: seconds(
                "JWT_REFRESH_TOKEN_EXPIRATION_TIME",
                defaults.refresh_expiration_secs,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

fn warn_default_secret(key: &str) {
    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production" || v == "prod")
        .unwrap_or(false);

    if is_production {
        tracing::error!(
            variable = key,
            "SECURITY: Using default JWT secret in production! Set the variable."
        );
    } else {
        tracing::warn!(variable = key, "Using default JWT secret. Set it for production use.");
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    email: String,
    role: Role,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
    typ: String, // access or refresh
}

fn token_type(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => "access",
        TokenKind::Refresh => "refresh",
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_secs: i64,
}

impl KeyPair {
    fn new(secret: &str, expiration_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs,
        }
    }
}

/// JWT-based token service. Access and refresh tokens use separate keys.
pub struct JwtTokenService {
    access: KeyPair,
    refresh: KeyPair,
    issuer: String,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            access: KeyPair::new(&config.access_secret, config.access_expiration_secs),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_expiration_secs),
            issuer: config.issuer,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, kind: TokenKind, payload: &TokenPayload) -> Result<String, AuthError> {
        let keys = self.keys(kind);
        let now = Utc::now();
        let exp = now + TimeDelta::seconds(keys.expiration_secs);

        let claims = Claims {
            sub: payload.id.to_string(),
            email: payload.email.clone(),
            role: payload.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            typ: token_type(kind).to_string(),
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.keys(kind).decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;

        if token_data.claims.typ != token_type(kind) {
            return Err(AuthError::InvalidToken(format!(
                "expected {} token, got {}",
                token_type(kind),
                token_data.claims.typ
            )));
        }

        let id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            payload: TokenPayload {
                id,
                email: token_data.claims.email,
                role: token_data.claims.role,
            },
            exp: token_data.claims.exp,
        })
    }

    fn expiration_seconds(&self, kind: TokenKind) -> i64 {
        self.keys(kind).expiration_secs
    }
}
