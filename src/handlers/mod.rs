pub mod protected;
pub mod public;

use axum::extract::State;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Mera API",
            "version": version,
            "description": "Administrative backend for the Mera meal-delivery service",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login, /auth/refresh, /auth/logout (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "admins": "/api/admins (protected, Super Admin)",
                "intake": "/api/intake/* (protected, Admin)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    let database_status = match state.pool() {
        Some(pool) => crate::database::manager::health_check(pool)
            .await
            .map(|_| "ok".to_string())
            .map_err(|e| e.to_string()),
        None => Ok("memory".to_string()),
    };

    match database_status {
        Ok(status) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": status
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e
                }
            })),
        ),
    }
}
