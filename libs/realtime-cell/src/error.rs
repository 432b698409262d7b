use thiserror::Error;
use uuid::Uuid;

/// Live delivery failures. These are never surfaced to API callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PushError {
    #[error("No active connections for user {0}")]
    NoActiveConnections(Uuid),

    #[error("Delivery failed on all {attempted} connections of user {user_id}")]
    DeliveryFailed { user_id: Uuid, attempted: usize },

    #[error("Channel registry is shut down")]
    RegistryClosed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Cannot register as another user")]
    IdentityMismatch,

    #[error("Invalid user identity: {0}")]
    InvalidIdentity(String),

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    #[error("Channel registry is shut down")]
    RegistryClosed,
}
