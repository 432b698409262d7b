use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use axum_extra::TypedHeader;
use futures::{SinkExt, StreamExt};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::{
    authenticate_connection, ChannelError, ChannelRegistry, ChannelSession, Connection,
    RealtimeEvent,
};

#[derive(Clone)]
pub struct RealtimeState {
    pub config: Arc<AppConfig>,
    pub registry: ChannelRegistry,
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Upgrades to a WebSocket. Identity comes from `?token=` or the bearer
/// header; failures are reported on the socket itself before closing.
pub async fn ws_handler(
    State(state): State<RealtimeState>,
    Query(params): Query<WsParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = params
        .token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| bearer.map(|TypedHeader(auth)| auth.token().to_string()));

    let identity = authenticate_connection(&state.config, token.as_deref());

    ws.on_upgrade(move |socket| handle_socket(state.registry, identity, socket))
}

async fn handle_socket(registry: ChannelRegistry, identity: Result<User, ChannelError>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();

    let user = match identity {
        Ok(user) => user,
        Err(e) => {
            warn!("Realtime connection rejected: {}", e);
            let _ = sink.send(encode(&RealtimeEvent::error(e.to_string()))).await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    let (connection, mut outbound) = Connection::open();
    let mut shutdown = registry.subscribe_shutdown();
    let mut session = ChannelSession::new(registry, connection, user);
    info!("Realtime connection {} opened", session.connection_id());

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else { break };
                if sink.send(encode(&event)).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let reply = session.handle_text(text.as_str()).await;
                        if sink.send(encode(&reply)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!("Realtime connection {} errored: {}", session.connection_id(), e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            _ = shutdown.changed() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }

    info!("Realtime connection {} closed", session.connection_id());
    session.close().await;
}

fn encode(event: &RealtimeEvent) -> Message {
    // The event enum only holds strings, ids and timestamps
    let json = serde_json::to_string(event)
        .unwrap_or_else(|_| r#"{"event":"error","data":{"message":"encoding failed"}}"#.to_string());
    Message::Text(json.into())
}
