//! Signal handling for graceful shutdown

use std::{future::Future, io};
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::{info, warn};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals = match Signals::new(&[
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to register signal handler: {}, falling back to Ctrl-C", e);
            wait_for_ctrl_c(tokio::signal::ctrl_c()).await;
            return;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}

/// Resolve when `ctrl_c` reports a Ctrl-C. If it cannot listen at all,
/// never resolve, so the server keeps running until the process is killed.
async fn wait_for_ctrl_c<F>(ctrl_c: F)
where
    F: Future<Output = io::Result<()>>,
{
    match ctrl_c.await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
