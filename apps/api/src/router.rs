use std::sync::Arc;

use axum::{routing::get, Router};

use consultation_cell::{consultation_routes, ConsultationState};
use notification_cell::{notification_routes, NotificationState};
use realtime_cell::{realtime_routes, ChannelRegistry};
use shared_config::AppConfig;

pub fn create_router(
    config: Arc<AppConfig>,
    registry: ChannelRegistry,
    notifications: NotificationState,
    consultations: ConsultationState,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Doctely API is running!" }))
        .nest("/notifications", notification_routes(config.clone(), notifications))
        .nest("/consultations", consultation_routes(config.clone(), consultations))
        .nest("/ws", realtime_routes(config, registry))
}
