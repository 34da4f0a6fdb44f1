pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;

/// Identity claims embedded in the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub uid: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, ttl_ms: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::milliseconds(ttl_ms as i64)).timestamp();

        Self {
            uid: user.id,
            email: user.email.clone(),
            name: user.display_name.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenGeneration(msg) => write!(f, "token generation error: {}", msg),
            TokenError::InvalidToken(msg) => write!(f, "invalid token: {}", msg),
            TokenError::InvalidSecret => write!(f, "invalid signing secret"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign a claim set into a compact session token.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::TokenGeneration(e.to_string()))
}

/// Verify a session token and return its claims.
///
/// Signature is checked before expiry; both a bad tag and a past `exp` come
/// back as the same `InvalidToken` failure. Expiry is exact (no leeway).
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}
