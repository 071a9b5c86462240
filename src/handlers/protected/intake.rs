// Intake pipeline endpoints: register -> fill form -> issue credentials
// (promote) or reject. Every handler runs the access gate before touching
// the workflow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::policy::{self, Action};
use crate::database::models::NewPotentialCustomer;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::IntakeForm;
use crate::state::AppState;

/// GET /api/intake/potential-customers - the intake queue
pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    policy::authorize(user.role, Action::ViewIntakeQueue)?;

    let records = state.intake.list().await?;
    Ok(Json(json!({ "success": true, "data": records })))
}

/// POST /api/intake/potential-customers - register a potential customer
pub async fn register(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(payload): Json<NewPotentialCustomer>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    policy::authorize(user.role, Action::RegisterPotentialCustomer)?;

    let staged = state.intake.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": staged })),
    ))
}

/// POST /api/intake/form - fill the intake form for a staged record
pub async fn fill_form(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(payload): Json<IntakeForm>,
) -> Result<Json<Value>, ApiError> {
    policy::authorize(user.role, Action::SubmitIntakeForm)?;

    let updated = state.intake.fill_form(&payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Customer data updated successfully",
        "data": updated
    })))
}

/// POST /api/intake/potential-customers/:id/credentials - promote the staged
/// record into an active customer. The plaintext password appears only in
/// this response.
pub async fn promote(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    policy::authorize(user.role, Action::IssueCredentials)?;

    let outcome = state.promotion.promote(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "customer": outcome.customer,
                "username": outcome.username,
                "password": outcome.password,
            }
        })),
    ))
}

/// DELETE /api/intake/potential-customers/:id - reject and remove
pub async fn reject(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    policy::authorize(user.role, Action::RejectPotentialCustomer)?;

    state.intake.reject(id).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "message": "Potential customer rejected and removed" }
    })))
}
