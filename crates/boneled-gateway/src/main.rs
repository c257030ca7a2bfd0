//! boneled gateway - BeagleBone LED server
//!
//! Discovers the LEDs on the configured pins and serves them over HTTP.
//!
//! # Configuration
//!
//! With no environment set, LEDs on `P9_12` and `P9_11` are served on port
//! 1337. See [`GatewayConfig::from_env`] for the recognized variables.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` and set `GPIO_BACKEND=mock` to run
//! without GPIO hardware.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boneled_gateway::{bootstrap, create_router, GatewayConfig, GatewayState};
use boneled_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,boneled=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    tracing::info!(
        name = %config.name,
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        pins = ?config.pins,
        gpio_backend = ?config.gpio_backend,
        "Gateway configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    let board = bootstrap::open_board(&config)?;
    let server = bootstrap::start_server(&config, store, board).await?;

    let listen_addr = config.listen_addr.clone();
    let name = config.name.clone();
    let app = create_router(GatewayState::new(server, config));

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("{name} is running at http://127.0.0.1:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
