use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, NotificationState};

pub fn notification_routes(config: Arc<AppConfig>, state: NotificationState) -> Router {
    Router::new()
        .route("/me", get(handlers::get_my_notifications))
        .route("/{notification_id}/read", put(handlers::mark_notification_read))
        .route("/{notification_id}", delete(handlers::delete_notification))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
