use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::policy::{self, Action, Role};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub role: Option<String>,
}

/// POST /api/admins - provision an admin account (Super Admin only).
/// Returns the derived username and one-time password for hand-off.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    policy::authorize(user.role, Action::ManageAdmins)?;

    let role = match payload.role.as_deref() {
        None => Role::Admin,
        Some(s) => Role::parse(s)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", s)))?,
    };

    let provisioned = state.auth.create_admin(&payload.email, role).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "admin": provisioned.admin,
                "password": provisioned.password,
            }
        })),
    ))
}
