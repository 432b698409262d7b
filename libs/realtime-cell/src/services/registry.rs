use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{ChannelError, ConnectionId, PushError, RealtimeEvent};

pub type EventSender = mpsc::UnboundedSender<RealtimeEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RealtimeEvent>;

/// Server side of one live socket: its id plus the queue feeding it.
pub struct Connection {
    id: ConnectionId,
    sender: EventSender,
}

impl Connection {
    pub fn open() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { id: ConnectionId::new(), sender }, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

#[derive(Default)]
struct RegistryState {
    // user -> live connections of that user
    channels: HashMap<Uuid, HashMap<ConnectionId, EventSender>>,
    // connection -> owning user
    owners: HashMap<ConnectionId, Uuid>,
    closed: bool,
}

impl RegistryState {
    fn detach(&mut self, connection_id: ConnectionId) -> Option<Uuid> {
        let user_id = self.owners.remove(&connection_id)?;
        if let Some(connections) = self.channels.get_mut(&user_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                self.channels.remove(&user_id);
            }
        }
        Some(user_id)
    }
}

/// Per-user addressable channels over live realtime connections.
///
/// Both indexes sit behind one lock so that a register or unregister is a
/// single atomic step for every other user of the registry.
pub struct ChannelRegistry {
    state: Arc<RwLock<RegistryState>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Attaches `connection` to the channel of `user_id`.
    ///
    /// Returns `false` when the connection was already registered for that
    /// user. A connection registered for another user is moved.
    pub async fn register(&self, connection: &Connection, user_id: Uuid) -> Result<bool, ChannelError> {
        let mut state = self.state.write().await;
        if state.closed {
            return Err(ChannelError::RegistryClosed);
        }

        if let Some(current) = state.owners.get(&connection.id).copied() {
            if current == user_id {
                debug!("Connection {} already registered for user {}", connection.id, user_id);
                return Ok(false);
            }
            state.detach(connection.id);
            debug!("Connection {} moved from user {} to {}", connection.id, current, user_id);
        }

        state.owners.insert(connection.id, user_id);
        state.channels
            .entry(user_id)
            .or_default()
            .insert(connection.id, connection.sender.clone());

        debug!("Registered connection {} for user {}", connection.id, user_id);
        Ok(true)
    }

    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut state = self.state.write().await;
        if let Some(user_id) = state.detach(connection_id) {
            debug!("Unregistered connection {} of user {}", connection_id, user_id);
        }
    }

    /// Delivers `event` to every live connection of `user_id`.
    ///
    /// Nothing is queued for offline users. Connections whose socket task is
    /// gone are pruned without affecting delivery to the others.
    pub async fn publish(&self, user_id: Uuid, event: RealtimeEvent) -> Result<usize, PushError> {
        let mut state = self.state.write().await;
        if state.closed {
            return Err(PushError::RegistryClosed);
        }

        let Some(connections) = state.channels.get(&user_id) else {
            return Err(PushError::NoActiveConnections(user_id));
        };

        let attempted = connections.len();
        let mut dead = Vec::new();
        for (connection_id, sender) in connections {
            if sender.send(event.clone()).is_err() {
                warn!("Dropping dead connection {} of user {}", connection_id, user_id);
                dead.push(*connection_id);
            }
        }

        for connection_id in &dead {
            state.detach(*connection_id);
        }

        let delivered = attempted - dead.len();
        if delivered == 0 {
            return Err(PushError::DeliveryFailed { user_id, attempted });
        }

        debug!("Published {} to {} connection(s) of user {}", event.name(), delivered, user_id);
        Ok(delivered)
    }

    pub async fn connection_count(&self, user_id: Uuid) -> usize {
        let state = self.state.read().await;
        state.channels.get(&user_id).map_or(0, HashMap::len)
    }

    pub async fn get_active_channels(&self) -> Vec<Uuid> {
        let state = self.state.read().await;
        state.channels.keys().cloned().collect()
    }

    pub async fn total_connections(&self) -> usize {
        let state = self.state.read().await;
        state.owners.len()
    }

    /// Fires once when the registry shuts down; socket tasks close on it.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Drops every registration and closes all live sockets.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        let dropped = state.owners.len();
        state.channels.clear();
        state.owners.clear();
        state.closed = true;
        drop(state);

        self.shutdown.send_replace(true);
        info!("Channel registry shut down, {} connection(s) dropped", dropped);
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ChannelRegistry {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}
