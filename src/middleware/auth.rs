use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};

use crate::auth::{self, policy::Role};
use crate::error::ApiError;

/// Authenticated admin context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub admin_id: i64,
    pub username: String,
    pub role: Role,
}

/// JWT authentication middleware that validates tokens and extracts the
/// caller's identity and role claim
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let unauthorized = |msg: String| {
        let api_error = ApiError::unauthorized(msg);
        (
            StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
            Json(api_error.to_json()),
        )
    };

    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(unauthorized)?;

    // Validate and decode JWT
    let claims = auth::verify_access_token(&token)
        .map_err(|e| unauthorized(format!("Invalid JWT token: {}", e)))?;

    // The role claim must name a known role before any policy check runs
    let role = Role::parse(&claims.role)
        .ok_or_else(|| unauthorized(format!("Unknown role claim: {}", claims.role)))?;

    let auth_user = AuthUser {
        admin_id: claims.sub,
        username: claims.username,
        role,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
