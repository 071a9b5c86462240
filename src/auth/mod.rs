pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::database::models::Admin;

/// Access-token claims carried on every protected request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(admin: &Admin) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: admin.admin_id,
            username: admin.username.clone(),
            role: admin.role.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Refresh-token claims. Deliberately minimal: the durable store row, not the
/// claim set, is what makes a refresh token live.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
}

impl RefreshClaims {
    pub fn new(admin: &Admin) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.refresh_expiry_days;
        let exp = (now + Duration::days(expiry_days as i64)).timestamp();

        Self {
            sub: admin.admin_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    TokenValidation(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::TokenValidation(msg) => write!(f, "JWT validation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_access_token(admin: &Admin) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;
    encode_with_secret(&Claims::new(admin), secret)
}

pub fn generate_refresh_token(admin: &Admin) -> Result<String, JwtError> {
    let secret = &config::config().security.refresh_secret;
    encode_with_secret(&RefreshClaims::new(admin), secret)
}

pub fn verify_access_token(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;
    decode_with_secret(token, secret)
}

pub fn verify_refresh_token(token: &str) -> Result<RefreshClaims, JwtError> {
    let secret = &config::config().security.refresh_secret;
    decode_with_secret(token, secret)
}

fn encode_with_secret<T: Serialize>(claims: &T, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn decode_with_secret<T: for<'de> Deserialize<'de>>(
    token: &str,
    secret: &str,
) -> Result<T, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<T>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::TokenValidation(e.to_string()))?;
    Ok(data.claims)
}
