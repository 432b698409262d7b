use thiserror::Error;
use uuid::Uuid;

use notification_cell::NotificationError;
use shared_database::StoreError;

/// Why a reminder tick stopped early.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Could not open store session: {0}")]
    Connect(StoreError),

    #[error("Appointment scan failed: {0}")]
    Query(StoreError),

    #[error("Reminder for appointment {appointment_id} failed: {source}")]
    Reminder {
        appointment_id: Uuid,
        source: NotificationError,
    },
}

impl ScanError {
    pub fn is_connectivity(&self) -> bool {
        match self {
            ScanError::Connect(e) | ScanError::Query(e) => e.is_connectivity(),
            ScanError::Reminder { source, .. } => source.is_connectivity(),
        }
    }
}
