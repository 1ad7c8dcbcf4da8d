//! Access token signing and validation
//!
//! Access tokens are HS256 JWTs (`header.payload.signature`, base64url).
//! They are stateless: nothing is stored server-side and the only way a
//! token stops working is its `exp` passing. Expiry is exact, no leeway.

use crate::{
    clock::Clock,
    config::AppConfig,
    error::{AppError, TokenError},
};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Issuer stamped into every access token
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// Minimum signing key length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Mints and validates access tokens with a process-wide symmetric key
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    pub fn new(
        secret: &[u8],
        access_token_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT secret too short (min {} bytes)",
                MIN_SECRET_LEN
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock after decoding
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_token_ttl,
            clock,
        })
    }

    /// Create signer from config
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret().as_bytes(),
            Duration::seconds(config.security.access_token_exp_secs as i64),
            clock,
        )
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Mint a token for `subject` valid for `ttl` from now
    pub fn mint(&self, subject: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = self.clock.now();

        let claims = Claims {
            sub: subject.to_string(),
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Mint a token with the configured access-token lifetime
    pub fn mint_access_token(&self, subject: Uuid) -> Result<String, TokenError> {
        self.mint(subject, self.access_token_ttl)
    }

    /// Validate a token and return its subject
    pub fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::from)?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)
    }
}
