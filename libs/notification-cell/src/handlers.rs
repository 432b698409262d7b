use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{Recipient, RecipientKind};
use crate::services::{NotificationService, RecipientDirectory};

#[derive(Clone)]
pub struct NotificationState {
    pub service: Arc<NotificationService>,
    pub directory: RecipientDirectory,
}

/// Maps the token identity onto an existing user row of its role.
pub async fn current_recipient(user: &User, directory: &RecipientDirectory) -> Result<Recipient, AppError> {
    let kind = RecipientKind::from(require_role(user)?);
    let id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))?;

    Ok(directory.require(kind, id).await?)
}

pub async fn get_my_notifications(
    State(state): State<NotificationState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let recipient = current_recipient(&user, &state.directory).await?;
    let notifications = state
        .service
        .list_for_recipient(recipient.id, recipient.kind)
        .await?;

    debug!("{} notification(s) for {}", notifications.len(), recipient.id);

    Ok(Json(json!({
        "success": true,
        "count": notifications.len(),
        "data": notifications
    })))
}

pub async fn mark_notification_read(
    State(state): State<NotificationState>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let recipient = current_recipient(&user, &state.directory).await?;
    let notification = state
        .service
        .mark_as_read(notification_id, recipient.id, recipient.kind)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification marquée comme lue",
        "data": notification
    })))
}

pub async fn delete_notification(
    State(state): State<NotificationState>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let recipient = current_recipient(&user, &state.directory).await?;
    state
        .service
        .delete(notification_id, recipient.id, recipient.kind)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification supprimée"
    })))
}
