use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one live socket. A user may own several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==============================================================================
// SERVER -> CLIENT EVENTS
// ==============================================================================

/// Frames pushed to clients, serialized as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RealtimeEvent {
    Notification(NotificationPayload),
    RdvReady(RdvReadyPayload),
    Registered(RegisteredPayload),
    Error(ErrorPayload),
}

impl RealtimeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::Notification(_) => "notification",
            RealtimeEvent::RdvReady(_) => "rdv_ready",
            RealtimeEvent::Registered(_) => "registered",
            RealtimeEvent::Error(_) => "error",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RealtimeEvent::Error(ErrorPayload { message: message.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub contenu: String,
    pub date: DateTime<Utc>,
    pub lue: bool,
}

pub const JOIN_ROOM_ACTION: &str = "join_room";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdvReadyPayload {
    #[serde(rename = "rdvId")]
    pub rdv_id: Uuid,
    pub message: String,
    pub action: String,
}

impl RdvReadyPayload {
    pub fn join_room(rdv_id: Uuid) -> Self {
        Self {
            rdv_id,
            message: "Rejoignez votre consultation".to_string(),
            action: JOIN_ROOM_ACTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredPayload {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

// ==============================================================================
// CLIENT -> SERVER EVENTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Register(String),
}
