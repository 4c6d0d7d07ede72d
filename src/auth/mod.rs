use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::Role;

/// Length of the random password assigned at registration
pub const TEMPORARY_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, name: String, role: Role, email: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            name,
            role,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// bcrypt is deliberately slow, so hashing runs on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Lowercase alphanumeric password handed out at registration
pub fn generate_temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMPORARY_PASSWORD_LENGTH)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            bcrypt_cost: 4,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn jwt_round_trip_preserves_claims() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "Ada Lovelace".into(), Role::Admin, "ada@example.com".into(), 144);
        let token = generate_jwt(&claims, &security()).unwrap();

        let decoded = validate_jwt(&token, &security()).unwrap();
        assert_eq!(decoded.user_id, id);
        assert_eq!(decoded.role, Role::Admin);
        assert_eq!(decoded.email, "ada@example.com");
        assert_eq!(decoded.exp - decoded.iat, 144 * 3600);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let claims = Claims::new(Uuid::new_v4(), "x".into(), Role::Leader, "x@y.z".into(), 1);
        let token = generate_jwt(&claims, &security()).unwrap();

        let other = SecurityConfig {
            jwt_secret: "another-secret".to_string(),
            ..security()
        };
        assert!(matches!(validate_jwt(&token, &other), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new(Uuid::new_v4(), "x".into(), Role::Cost, "x@y.z".into(), 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt(&claims, &security()).unwrap();
        assert!(validate_jwt(&token, &security()).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let empty = SecurityConfig {
            jwt_secret: String::new(),
            ..security()
        };
        let claims = Claims::new(Uuid::new_v4(), "x".into(), Role::Cost, "x@y.z".into(), 1);
        assert!(matches!(generate_jwt(&claims, &empty), Err(AuthError::InvalidSecret)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("hunter22", 4).await.unwrap();
        assert!(verify_password("hunter22", &hash).await.unwrap());
        assert!(!verify_password("hunter23", &hash).await.unwrap());
    }

    #[test]
    fn temporary_password_shape() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
