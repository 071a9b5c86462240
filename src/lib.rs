pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router over the given state. Tests drive this
/// directly with an in-memory state.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from configuration: the configured origin list, or wide open
/// when the list contains "*". Disabled CORS emits no headers at all.
fn cors_layer() -> CorsLayer {
    let security = &config::config().security;

    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
}

fn api_routes() -> Router<AppState> {
    use handlers::protected::{admins, auth, intake};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        // Admin provisioning (Super Admin)
        .route("/api/admins", post(admins::create))
        // Intake pipeline (Admin)
        .route(
            "/api/intake/potential-customers",
            get(intake::list).post(intake::register),
        )
        .route("/api/intake/form", post(intake::fill_form))
        .route(
            "/api/intake/potential-customers/:id/credentials",
            post(intake::promote),
        )
        .route(
            "/api/intake/potential-customers/:id",
            delete(intake::reject),
        )
        .layer(from_fn(middleware::jwt_auth_middleware))
}
