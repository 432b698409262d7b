use thiserror::Error;

/// Failure talking to the persistent store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// True when the store could not be reached at all, as opposed to the
    /// store rejecting the request.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => StoreError::Unauthorized(body),
            404 => StoreError::NotFound(body),
            409 => StoreError::Constraint(body),
            400 if is_integrity_violation(&body) => StoreError::Constraint(body),
            502 | 503 | 504 => StoreError::Unavailable(body),
            _ => StoreError::Api { status, message: body },
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

// PostgREST forwards the Postgres SQLSTATE in `code`; class 23 is integrity.
fn is_integrity_violation(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(|c| c.starts_with("23")))
        .unwrap_or(false)
}
