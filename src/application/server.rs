use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, ensure};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AUTH_RATE_LIMIT_PER_MINUTE, AppState, AppStateConfig};
use crate::infrastructure::database::Database;
use crate::infrastructure::media::{CloudinaryConfig, CloudinaryMediaStore};
use crate::infrastructure::tokens::TokenService;

/// Outbound requests to the media store give up after this long.
const MEDIA_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cloudinary: CloudinaryConfig,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    ensure!(
        !config.jwt_secret.trim().is_empty(),
        "BOOKSHELF_JWT_SECRET must not be empty"
    );

    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let http = reqwest::Client::builder()
        .timeout(MEDIA_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            media: Arc::new(CloudinaryMediaStore::new(config.cloudinary, http)),
            tokens: TokenService::new(config.jwt_secret, config.token_ttl),
            auth_requests_per_minute: AUTH_RATE_LIMIT_PER_MINUTE,
        },
    );

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
