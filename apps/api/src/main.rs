use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{AppointmentReminderScheduler, SupabaseAppointmentStore};
use consultation_cell::{ConsultationService, ConsultationState, SupabaseConsultationStore};
use notification_cell::{
    DoctorLookup, NotificationService, NotificationState, RecipientDirectory, SupabaseNotificationStore,
};
use realtime_cell::ChannelRegistry;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Doctely API server");

    let config = Arc::new(AppConfig::from_env());
    let supabase = Arc::new(SupabaseClient::new(&config));

    // Process-wide channel registry; every socket and every sender shares it
    let registry = ChannelRegistry::new();

    let notifications = Arc::new(NotificationService::new(
        Arc::new(SupabaseNotificationStore::new(supabase.clone())),
        registry.clone(),
        Arc::new(DoctorLookup::new(supabase.clone())),
        config.notification_fanout_limit,
    ));
    let directory = RecipientDirectory::supabase(supabase.clone());

    let consultations = Arc::new(ConsultationService::new(
        Arc::new(SupabaseConsultationStore::new(supabase.clone())),
        notifications.clone(),
    ));

    let scheduler = Arc::new(AppointmentReminderScheduler::new(
        Arc::new(SupabaseAppointmentStore::new(supabase.clone())),
        notifications.clone(),
        &config,
    ));
    let scheduler_handle = scheduler.start();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(
        config.clone(),
        registry.clone(),
        NotificationState {
            service: notifications.clone(),
            directory: directory.clone(),
        },
        ConsultationState {
            service: consultations,
            directory,
        },
    )
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new()
                .level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new()
                .level(Level::INFO)),
    )
    .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down background work");
    scheduler_handle.shutdown().await;
    registry.shutdown().await;
    supabase.disconnect().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
