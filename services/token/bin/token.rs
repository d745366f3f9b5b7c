//! Main Entrypoint for the Nevira Token Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment (exiting non-zero when the
//!    signing credentials are unset).
//! 2. Initializing logging.
//! 3. Wiring the room directory used for occupancy checks.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use nevira_token::{
    config::Config,
    occupancy::{EmptyRoomDirectory, HttpRoomDirectory, RoomDirectory},
    router::create_router,
    state::AppState,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials are required; a missing key aborts before we ever bind.
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    let directory: Arc<dyn RoomDirectory> = match &config.room_service_url {
        Some(url) => {
            info!(url = %url, "Occupancy checks enabled against room service");
            Arc::new(HttpRoomDirectory::new(url.clone()))
        }
        None => {
            info!("ROOM_SERVICE_URL unset; occupancy checks treat every room as empty");
            Arc::new(EmptyRoomDirectory)
        }
    };

    let app_state = Arc::new(AppState {
        config: Arc::new(config.clone()),
        directory,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    info!(
        bind_address = %config.bind_address,
        max_participants = config.max_participants,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
