// Public auth endpoints: token acquisition and revocation.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/login - validate credentials, issue access + refresh tokens
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let pair = state.auth.login(&payload.username, &payload.password).await?;
    Ok(Json(json!({ "success": true, "data": pair })))
}

/// POST /auth/refresh - exchange a live refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    let access_token = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "access_token": access_token }
    })))
}

/// POST /auth/logout - revoke the refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    state.auth.logout(&payload.refresh_token).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "message": "Logged out" }
    })))
}
