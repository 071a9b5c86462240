use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::auth::{self, policy::Role};
use crate::config;
use crate::database::models::{Admin, NewAdmin};
use crate::database::store::{AdminStore, RefreshTokenStore, StoreError};
use crate::services::credentials;
use crate::services::AuthError;

/// Token pair issued at login. Refresh issues a new access token only; the
/// refresh token itself is not rotated.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Freshly provisioned admin with the one-time plaintext password.
#[derive(Debug, Serialize)]
pub struct ProvisionedAdmin {
    pub admin: Admin,
    pub password: String,
}

pub struct AuthService {
    admins: Arc<dyn AdminStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl AuthService {
    pub fn new(admins: Arc<dyn AdminStore>, refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            admins,
            refresh_tokens,
        }
    }

    /// Validate credentials, then issue an access token and a durable
    /// refresh token.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let admin = self
            .admins
            .find_by_username(username)
            .await
            .map_err(store_internal)?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid =
            credentials::verify_password(password.to_string(), admin.password_hash.clone())
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token =
            auth::generate_access_token(&admin).map_err(|e| AuthError::Token(e.to_string()))?;
        let refresh_token =
            auth::generate_refresh_token(&admin).map_err(|e| AuthError::Token(e.to_string()))?;

        self.refresh_tokens
            .insert(&refresh_token, admin.admin_id)
            .await?;

        info!(admin_id = admin.admin_id, username = %admin.username, "admin logged in");

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: config::config().security.jwt_expiry_hours * 3600,
        })
    }

    /// Exchange a live refresh token for a new access token. The token must
    /// carry a valid signature AND still exist in the store.
    pub async fn refresh(&self, token: &str) -> Result<String, AuthError> {
        let claims =
            auth::verify_refresh_token(token).map_err(|e| AuthError::Token(e.to_string()))?;

        self.refresh_tokens
            .find(token)
            .await
            .map_err(store_internal)?
            .ok_or(AuthError::TokenNotFound)?;

        let admin = self
            .admins
            .find(claims.sub)
            .await
            .map_err(store_internal)?
            .ok_or(AuthError::AdminNotFound)?;

        auth::generate_access_token(&admin).map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Revoke a refresh token. Logging out a token that is not in the store
    /// is an error, matching the lookup-then-delete contract.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self
            .refresh_tokens
            .delete(token)
            .await
            .map_err(store_internal)?
        {
            Ok(())
        } else {
            Err(AuthError::TokenNotFound)
        }
    }

    /// Provision an admin account. The username is the email local part and
    /// the initial password is derived from it; the plaintext is returned
    /// once for hand-off and stored only as a hash.
    pub async fn create_admin(
        &self,
        email: &str,
        role: Role,
    ) -> Result<ProvisionedAdmin, AuthError> {
        let username = email.split('@').next().unwrap_or(email).to_string();
        let password = format!("{}123", username);

        let password_hash = credentials::hash_password(password.clone())
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let admin = self
            .admins
            .insert(NewAdmin {
                username,
                password_hash,
                email: Some(email.to_string()),
                role: role.as_str().to_string(),
            })
            .await?;

        info!(admin_id = admin.admin_id, username = %admin.username, role = %admin.role,
            "provisioned admin");

        Ok(ProvisionedAdmin { admin, password })
    }
}

fn store_internal(err: StoreError) -> AuthError {
    AuthError::Internal(err.to_string())
}
