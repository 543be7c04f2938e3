use anyhow::{anyhow, Result};
/// JWT validation for resolved caller identity (HS256 shared secret).
/// Token issuance lives in the identity service; this module only needs to
/// validate access tokens and mint short-lived ones for tests.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

lazy_static! {
    static ref JWT_KEYS: RwLock<Option<(EncodingKey, DecodingKey)>> = RwLock::new(None);
}

/// Initialize the shared secret. Must be called during application startup
/// before any JWT operations.
pub fn initialize_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("JWT secret must not be empty"));
    }

    let mut keys = JWT_KEYS
        .write()
        .map_err(|e| anyhow!("Failed to acquire write lock on JWT keys: {}", e))?;
    *keys = Some((
        EncodingKey::from_secret(secret.as_bytes()),
        DecodingKey::from_secret(secret.as_bytes()),
    ));

    Ok(())
}

fn get_encoding_key() -> Result<EncodingKey> {
    let keys = JWT_KEYS
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT keys: {}", e))?;

    keys.as_ref()
        .map(|(enc, _)| enc.clone())
        .ok_or_else(|| anyhow!("JWT secret not initialized. Call initialize_secret() during startup"))
}

fn get_decoding_key() -> Result<DecodingKey> {
    let keys = JWT_KEYS
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT keys: {}", e))?;

    keys.as_ref()
        .map(|(_, dec)| dec.clone())
        .ok_or_else(|| anyhow!("JWT secret not initialized. Call initialize_secret() during startup"))
}

/// Generate an access token for the given user.
pub fn generate_token(user_id: Uuid, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now();
    let expiry = now + Duration::seconds(ttl_seconds);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
    };

    let encoding_key = get_encoding_key()?;
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| anyhow!("Failed to generate token: {}", e))
}

/// Validate a token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = get_decoding_key()?;
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| anyhow!("Token validation failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_subject() {
        initialize_secret("unit-test-secret").unwrap();
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, 60).unwrap();
        let data = validate_token(&token).unwrap();

        assert_eq!(data.claims.sub, user_id.to_string());
    }

    #[test]
    fn expired_token_is_rejected() {
        initialize_secret("unit-test-secret").unwrap();

        let token = generate_token(Uuid::new_v4(), -120).unwrap();
        assert!(validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        initialize_secret("unit-test-secret").unwrap();
        assert!(validate_token("not-a-jwt").is_err());
    }
}
