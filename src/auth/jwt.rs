//! JWT Token Handler
//! Mission: Generate and validate session tokens securely

use crate::auth::models::{Claims, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Session tokens live for exactly one hour
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: TOKEN_TTL_SECS,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<(String, i64)> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            username: user.name.clone(),
            user_id: user.id.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        debug!(
            "Generating JWT for user {} ({}), expires in {}s",
            user.name, user.id, self.ttl_secs
        );

        let token = self.sign(&claims)?;
        Ok((token, self.ttl_secs))
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key).context("Failed to generate JWT")
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid or expired token")?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }

    /// Expiry of a token signed by this handler, ignoring whether it has already passed.
    /// `None` for anything that is not one of ours.
    pub fn expiry_of(&self, token: &str) -> Option<i64> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims.exp)
    }
}
