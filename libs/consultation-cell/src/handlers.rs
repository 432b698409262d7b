use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use notification_cell::handlers::current_recipient;
use notification_cell::{Recipient, RecipientDirectory, RecipientKind};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::SubmitConsultationBody;
use crate::services::consultation::{DOCTORS_ONLY, PATIENTS_ONLY};
use crate::services::ConsultationService;

#[derive(Clone)]
pub struct ConsultationState {
    pub service: Arc<ConsultationService>,
    pub directory: RecipientDirectory,
}

/// Role is checked on the token before the caller's row is looked up.
async fn caller_of_kind(
    user: &User,
    directory: &RecipientDirectory,
    kind: RecipientKind,
    denied: &str,
) -> Result<Recipient, AppError> {
    if RecipientKind::from(require_role(user)?) != kind {
        return Err(AppError::Forbidden(denied.to_string()));
    }
    current_recipient(user, directory).await
}

pub async fn submit_consultation(
    State(state): State<ConsultationState>,
    Extension(user): Extension<User>,
    Json(body): Json<SubmitConsultationBody>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = caller_of_kind(&user, &state.directory, RecipientKind::Patient, PATIENTS_ONLY).await?;
    let request = state
        .service
        .submit(&patient, body.specialite.as_deref(), body.motif.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": request
        })),
    ))
}

pub async fn get_pending_consultations(
    State(state): State<ConsultationState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor = caller_of_kind(&user, &state.directory, RecipientKind::Medecin, DOCTORS_ONLY).await?;
    let requests = state.service.list_pending_for_doctor(&doctor).await?;

    Ok(Json(json!({
        "success": true,
        "count": requests.len(),
        "data": requests
    })))
}

pub async fn accept_consultation(
    State(state): State<ConsultationState>,
    Path(request_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor = caller_of_kind(&user, &state.directory, RecipientKind::Medecin, DOCTORS_ONLY).await?;
    let request = state.service.accept(&doctor, request_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": request
    })))
}

pub async fn reject_consultation(
    State(state): State<ConsultationState>,
    Path(request_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let doctor = caller_of_kind(&user, &state.directory, RecipientKind::Medecin, DOCTORS_ONLY).await?;
    let request = state.service.reject(&doctor, request_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": request
    })))
}
