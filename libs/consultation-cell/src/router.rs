use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ConsultationState};

pub fn consultation_routes(config: Arc<AppConfig>, state: ConsultationState) -> Router {
    Router::new()
        .route("/", post(handlers::submit_consultation))
        .route("/pending", get(handlers::get_pending_consultations))
        .route("/{request_id}/accept", put(handlers::accept_consultation))
        .route("/{request_id}/reject", put(handlers::reject_consultation))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
