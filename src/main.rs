//! Drink Water - reminds you to drink water on a configurable interval
//!
//! This is the main entry point for the drink-water application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use drink_water::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{AnyBackend, SettingsStore},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("drink_water={},tower_http=info", config.log_level()))
        .init();

    info!("Starting drink-water v{}", env!("CARGO_PKG_VERSION"));

    let store = SettingsStore::new(config.settings_path());
    let backend = AnyBackend::from_headless_flag(config.headless);
    info!(
        "Configuration: host={}, port={}, settings={}, headless={}",
        config.host,
        config.port,
        store.path().display(),
        config.headless
    );

    // Load settings and start the scheduler and window coordinator tasks
    let state = Arc::new(AppState::spawn(
        config.port,
        config.host.clone(),
        store,
        backend,
    )?);

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control surface running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /settings    - Current interval fields");
    info!("  POST /start       - Start the reminder");
    info!("  POST /stop        - Stop the reminder");
    info!("  PUT  /config      - Commit an edited interval");
    info!("  POST /normalize   - Normalize interval fields");
    info!("  GET  /popup       - Open popup contents");
    info!("  POST /popup/close - Close the popup");
    info!("  GET  /status      - Reminder status");
    info!("  GET  /health      - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
