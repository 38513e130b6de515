//! Tune Timer - A countdown timer that plays a looping track while it runs
//!
//! This is the main entry point for the tune-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use tune_timer::{
    config::Config,
    state::{AppState, TimerSession},
    api::create_router,
    tasks::{display_task, CountdownTask},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tune_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tune-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, track={}, backend={:?}",
          config.host, config.port, config.track.display(), config.backend);

    let backend = config.audio_backend().map_err(anyhow::Error::msg)?;

    // Create the session and apply the audio mode once
    let mut session = TimerSession::new(backend, config.track.clone());
    session.configure(config.selection())?;
    let state = Arc::new(AppState::new(config.port, config.host.clone(), session));
    state.configure_audio(config.audio_options()).await;

    // Start the countdown background task
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    if config.display {
        let display_state = Arc::clone(&state);
        tokio::spawn(async move {
            display_task(display_state).await;
        });
    }

    if config.autostart {
        if let Err(e) = state.start().await {
            error!("Autostart failed: {}", e);
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /duration - Set hours, minutes and seconds");
    info!("  POST /start    - Start the countdown and the music");
    info!("  POST /reset    - Stop and restore the defaults");
    info!("  GET  /status   - Current remaining time and state");
    info!("  GET  /ranges   - Picker values");
    info!("  GET  /health   - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Cancel the pending tick and release any open audio
    state.shutdown().await;
    countdown.stop().await;

    info!("Server shutdown complete");
    Ok(())
}
