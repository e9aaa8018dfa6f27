//! PWD registry ID wizard API server entry point.

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use chrono::TimeDelta;
use pwd_registry_core::clock::{Clock, SystemClock};
use pwd_registry_core::repository::EventRepository;
use pwd_registry_event_store::in_memory_event_repository::InMemoryEventRepository;
use pwd_registry_id_wizard::capture::StillExporter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pwd_registry_api::config::ServerConfig;
use pwd_registry_api::routes;
use pwd_registry_api::state::AppState;
use pwd_registry_api::sweeper::{self, SWEEP_PERIOD};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting PWD registry ID wizard API server");

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;

    // Drafts are working state and live only as long as the process.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let drafts = Arc::new(InMemoryEventRepository::new());
    let event_repository: Arc<dyn EventRepository> = drafts.clone();
    let app_state = AppState::new(
        Arc::clone(&clock),
        event_repository,
        StillExporter::new(config.photo_max_edge)
            .with_max_upload_edge(config.photo_max_upload_edge),
    );
    let _sweeper = sweeper::spawn_idle_draft_sweeper(
        drafts,
        clock,
        TimeDelta::minutes(i64::from(config.draft_idle_minutes)),
        SWEEP_PERIOD,
    );

    // TODO: Replace CorsLayer::permissive() with the registry frontend's origin.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/id-drafts", routes::id_drafts::router())
        .layer(DefaultBodyLimit::max(config.photo_max_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!(
        photo_max_edge = config.photo_max_edge,
        photo_max_bytes = config.photo_max_bytes,
        photo_max_upload_edge = config.photo_max_upload_edge,
        draft_idle_minutes = config.draft_idle_minutes,
        "Listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
