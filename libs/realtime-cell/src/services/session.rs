use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_utils::jwt::validate_token;

use crate::{
    ChannelError, ChannelRegistry, ClientEvent, Connection, ConnectionId, RealtimeEvent,
    RegisteredPayload,
};

/// Resolves the identity a socket presents at upgrade time.
pub fn authenticate_connection(config: &AppConfig, token: Option<&str>) -> Result<User, ChannelError> {
    let token = token
        .ok_or_else(|| ChannelError::Unauthenticated("missing token".to_string()))?;

    validate_token(token, &config.supabase_jwt_secret)
        .map_err(|e| ChannelError::Unauthenticated(e.to_string()))
}

/// Protocol state of one authenticated socket.
pub struct ChannelSession {
    registry: ChannelRegistry,
    connection: Connection,
    identity: User,
}

impl ChannelSession {
    pub fn new(registry: ChannelRegistry, connection: Connection, identity: User) -> Self {
        Self { registry, connection, identity }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Handles one inbound text frame and returns the reply to send back.
    pub async fn handle_text(&mut self, text: &str) -> RealtimeEvent {
        match self.process(text).await {
            Ok(user_id) => RealtimeEvent::Registered(RegisteredPayload { user_id }),
            Err(e) => {
                warn!("Rejected event on connection {}: {}", self.connection.id(), e);
                RealtimeEvent::error(e.to_string())
            }
        }
    }

    async fn process(&mut self, text: &str) -> Result<Uuid, ChannelError> {
        let event: ClientEvent = serde_json::from_str(text)
            .map_err(|e| ChannelError::UnsupportedEvent(e.to_string()))?;

        match event {
            ClientEvent::Register(raw_user_id) => {
                let user_id = Uuid::parse_str(raw_user_id.trim())
                    .map_err(|_| ChannelError::InvalidIdentity(raw_user_id.clone()))?;

                if user_id.to_string() != self.identity.id.to_ascii_lowercase() {
                    return Err(ChannelError::IdentityMismatch);
                }

                self.registry.register(&self.connection, user_id).await?;
                debug!("Connection {} joined channel {}", self.connection.id(), user_id);
                Ok(user_id)
            }
        }
    }

    pub async fn close(self) {
        self.registry.unregister(self.connection.id()).await;
    }
}
