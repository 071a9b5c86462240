use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use mera_api::auth::policy::Role;
use mera_api::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

/// Router over an in-memory store; no external services needed.
pub fn spawn_app() -> TestApp {
    let state = AppState::in_memory();
    TestApp {
        app: mera_api::app(state.clone()),
        state,
    }
}

/// Provision an admin with the given role and log them in, returning a
/// bearer token.
pub async fn admin_token(state: &AppState, email: &str, role: Role) -> Result<String> {
    let provisioned = state.auth.create_admin(email, role).await?;
    let pair = state
        .auth
        .login(&provisioned.admin.username, &provisioned.password)
        .await?;
    Ok(pair.access_token)
}

/// One-shot a request through the router and decode the JSON body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(u16, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("router error: {e}"))?;
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}
