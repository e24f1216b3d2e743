use common::tracing::init_tracing;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};
use weather_service::cache::ServerCaches;
use weather_service::config::Config;
use weather_service::{build_state, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env();
    init_tracing(config.log_format)?;

    if let Err(e) = dotenv {
        info!(reason = %e, "No .env file loaded");
    }
    if config.weather_api_key.is_none() {
        warn!("WEATHER_API_KEY is not set; weather endpoints will fail");
    }
    if config.rapid_api_key.is_none() {
        warn!("RAPID_API_KEY is not set; city search will fail");
    }

    let mut caches = ServerCaches::new(
        config.search_cache_ttl_seconds,
        config.weather_cache_ttl_seconds,
    );
    caches.start_sweeping(config.cache_sweep_interval_seconds);

    let state = build_state(&config, &caches)?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Weather service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    caches.shutdown().await;
    info!("Weather service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    warn!("Shutting down gracefully...");
}
