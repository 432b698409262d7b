use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers::{ws_handler, RealtimeState};
use crate::ChannelRegistry;

/// Socket authentication happens inside the upgrade, so this route sits
/// outside the bearer middleware.
pub fn realtime_routes(config: Arc<AppConfig>, registry: ChannelRegistry) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .with_state(RealtimeState { config, registry })
}
