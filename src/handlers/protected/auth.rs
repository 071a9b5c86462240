use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - current caller identity from the access token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "admin_id": user.admin_id,
            "username": user.username,
            "role": user.role.as_str(),
        }
    }))
}
