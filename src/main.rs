//! Interval Timer - a drift-corrected interval workout timer
//!
//! This is the main entry point for the interval-timer application.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::info;

use interval_timer::{
    api::create_router,
    config::Config,
    services::{CueDispatcher, JsonFileStore},
    state::AppState,
    tasks::{countdown_driver_task, display_log_task, wake_up_recovery_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "interval_timer={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting interval-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, settings={}, audio={:?}, frame={}ms",
        config.host,
        config.port,
        config.settings.display(),
        config.audio,
        config.frame_ms
    );

    // Create application state from the stored settings
    let store = Arc::new(JsonFileStore::new(config.settings.clone()));
    let cues = CueDispatcher::new(config.audio.sink(), config.sound);
    let state = Arc::new(AppState::new(config.port, config.host.clone(), store, cues));

    // Start the background tasks
    tokio::spawn(countdown_driver_task(Arc::clone(&state), config.frame()));
    tokio::spawn(wake_up_recovery_task(
        Arc::clone(&state),
        Duration::from_secs(1),
    ));
    tokio::spawn(display_log_task(state.display_tx.subscribe()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                 - Start or resume the timer");
    info!("  POST /pause                 - Pause the timer");
    info!("  POST /toggle                - Start/pause toggle");
    info!("  POST /reset                 - Reset to the first segment");
    info!("  POST /visibility            - Report client visibility");
    info!("  POST /sound/toggle          - Toggle cue sounds");
    info!("  GET  /settings              - Workout settings and ranges");
    info!("  PUT  /settings/:key         - Set a setting");
    info!("  POST /settings/:key/adjust  - Step a setting");
    info!("  GET  /status                - Current display and summary");
    info!("  GET  /health                - Health check");

    // Setup graceful shutdown
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

    info!("Server shutdown complete");
    Ok(())
}
