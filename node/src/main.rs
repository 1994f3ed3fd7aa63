// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use badge_node::config::NodeConfig;
use badge_node::relay::UploadRelay;
use badge_node::server::{build_router, AppState};
use badge_node::store::BadgeStore;
use badge_node::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry();

    let cfg = NodeConfig::from_env();
    tracing::info!("Initializing Badge Node with config: {:?}", cfg);

    let store = BadgeStore::new(&cfg.badges_path);
    match store.ensure_exists().await {
        Ok(true) => tracing::info!("Created empty badges file at {:?}", store.path()),
        Ok(false) => tracing::info!("Using badges file at {:?}", store.path()),
        // Requests still work; they read as empty until a write succeeds.
        Err(e) => tracing::error!("Failed to create badges file at {:?}: {}", store.path(), e),
    }

    let relay = UploadRelay::new(&cfg)?;
    tracing::info!("Relaying uploads to {}", relay.endpoint());

    let app = build_router(AppState::new(store, relay), cfg.max_upload_bytes);

    let listener = TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!("Badge dashboard running on http://{}", cfg.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
