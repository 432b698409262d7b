use thiserror::Error;
use uuid::Uuid;

use notification_cell::NotificationError;
use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsultationError {
    #[error("{0}")]
    Forbidden(String),

    #[error("Consultation request {0} not found")]
    NotFound(Uuid),

    #[error("Consultation request {0} was already processed")]
    AlreadyProcessed(Uuid),

    #[error("Request specialty does not match the doctor's")]
    SpecialtyMismatch,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Recipient(#[from] NotificationError),
}

impl From<ConsultationError> for AppError {
    fn from(e: ConsultationError) -> Self {
        match e {
            ConsultationError::Forbidden(msg) => AppError::Forbidden(msg),
            ConsultationError::NotFound(_) => AppError::NotFound("Demande non trouvée.".to_string()),
            ConsultationError::AlreadyProcessed(_) => AppError::BadRequest("Cette demande a déjà été traitée.".to_string()),
            ConsultationError::SpecialtyMismatch => AppError::Forbidden(
                "Vous ne pouvez traiter que les demandes correspondant à votre spécialité.".to_string(),
            ),
            ConsultationError::Validation(msg) => AppError::ValidationError(msg),
            ConsultationError::Store(store) if store.is_connectivity() => AppError::Unavailable(store.to_string()),
            ConsultationError::Store(store) => AppError::Database(store.to_string()),
            ConsultationError::Recipient(inner) => inner.into(),
        }
    }
}
