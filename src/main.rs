// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::application::auth_service::AuthService;
use crate::application::chart_service::ChartService;
use crate::application::identity_provider::IdentityProvider;
use crate::application::layout_service::TileLayoutManager;
use crate::application::layout_storage::{LayoutStorage, MemoryLayoutStorage};
use crate::application::sensor_service::SensorService;
use crate::application::session_store::SessionStore;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::file_layout_storage::FileLayoutStorage;
use crate::infrastructure::http_sensor_repository::HttpSensorRepository;
use crate::infrastructure::identity_client::IdentityClient;
use crate::infrastructure::layout_writer::LayoutWriter;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("terrarium_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create adapters (infrastructure layer)
    let repository = Arc::new(HttpSensorRepository::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let provider: Arc<dyn IdentityProvider> = Arc::new(IdentityClient::new(
        config.identity.base_url.clone(),
        config.identity.api_key.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let writer = config.storage.layout_path().map(|path| {
        tracing::info!("Dashboard layout stored at {}", path.display());
        LayoutWriter::spawn(Arc::new(FileLayoutStorage::new(path)))
    });
    let storage: Arc<dyn LayoutStorage> = match &writer {
        Some(writer) => writer.clone(),
        None => {
            tracing::warn!("No layout path configured, tile changes will not survive a restart");
            Arc::new(MemoryLayoutStorage::default())
        }
    };

    // Session follows the provider's auth state
    let session = SessionStore::new();
    session.attach(provider.clone());
    match tokio::time::timeout(Duration::from_secs(5), session.resolved()).await {
        Ok(identity) => tracing::info!("Session ready (signed in: {})", identity.user.is_some()),
        Err(_) => tracing::warn!("Identity provider has not reported yet, pages show Loading..."),
    }

    // Create services (application layer)
    let state = Arc::new(AppState {
        session,
        auth_service: AuthService::new(provider),
        sensor_service: SensorService::new(repository.clone()),
        chart_service: ChartService::new(repository),
        layout: Mutex::new(TileLayoutManager::open(storage)),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    tracing::info!("Starting terrarium dashboard on http://{}", addr);
    tracing::info!("Reading sensor data from {}", config.api.base_url);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    // Don't drop the last layout change on exit
    if let Some(writer) = writer {
        writer.flush().await;
    }

    Ok(())
}
