use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

use crate::models::RecipientKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// The record could not be written or read; nothing was pushed.
    #[error("Notification persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Notification {0} not found")]
    NotFound(Uuid),

    #[error("No {kind} found with id {id}")]
    UnknownRecipient { id: Uuid, kind: RecipientKind },

    #[error("No lookup registered for recipient kind {0}")]
    UnsupportedKind(RecipientKind),
}

impl NotificationError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, NotificationError::Persistence(e) if e.is_connectivity())
    }
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => AppError::NotFound("Notification introuvable".to_string()),
            NotificationError::UnknownRecipient { .. } => AppError::NotFound("Utilisateur introuvable".to_string()),
            NotificationError::UnsupportedKind(kind) => AppError::BadRequest(format!("Unsupported recipient kind: {}", kind)),
            NotificationError::Persistence(store) if store.is_connectivity() => AppError::Unavailable(store.to_string()),
            NotificationError::Persistence(store) => AppError::Database(store.to_string()),
        }
    }
}
