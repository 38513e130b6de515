//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch, Mutex as AsyncMutex};
use tracing::{info, warn};

use super::{DurationSelection, TickOutcome, TimerSession, TimerSnapshot};
use crate::{
    audio::{AudioBackend, AudioSessionOptions},
    error::TimerError,
};

/// Lifecycle notifications consumed by the countdown task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The countdown (re)started; the tick must be re-armed for `generation`
    Started { total_seconds: u64, generation: u64 },
    /// The countdown reached zero
    Finished,
    /// The timer was reset by the user
    Reset,
    /// The session is being torn down
    Shutdown,
}

/// Main application state that owns the timer session
pub struct AppState {
    /// The one countdown session; audio calls are awaited while holding it
    pub session: AsyncMutex<TimerSession>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for lifecycle notifications
    pub event_tx: broadcast::Sender<SessionEvent>,
    /// Channel for display updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState around a fresh idle session
    pub fn new(port: u16, host: String, session: TimerSession) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        Self {
            session: AsyncMutex::new(session),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Convenience constructor used by tests and embedders
    pub fn with_backend(backend: Arc<dyn AudioBackend>, track: &str) -> Self {
        Self::new(0, "127.0.0.1".to_string(), TimerSession::new(backend, track))
    }

    /// Subscribe to lifecycle notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to snapshot updates
    pub fn watch_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Apply the process-wide audio options once at startup
    pub async fn configure_audio(&self, options: AudioSessionOptions) -> TimerSnapshot {
        let mut session = self.session.lock().await;
        session.configure_audio(options).await;
        self.publish(&session)
    }

    /// Change the duration used by the next start
    pub async fn set_duration(&self, selection: DurationSelection) -> Result<TimerSnapshot, TimerError> {
        let mut session = self.session.lock().await;
        session.configure(selection)?;
        self.record_action("duration");
        Ok(self.publish(&session))
    }

    /// Start (or restart) the countdown
    pub async fn start(&self) -> Result<TimerSnapshot, TimerError> {
        let mut session = self.session.lock().await;
        let total_seconds = session.start().await?;
        let generation = session.generation();
        self.record_action("start");
        self.notify(SessionEvent::Started { total_seconds, generation });
        Ok(self.publish(&session))
    }

    /// Reset to defaults and stop the music
    pub async fn reset(&self) -> TimerSnapshot {
        let mut session = self.session.lock().await;
        session.reset().await;
        self.record_action("reset");
        self.notify(SessionEvent::Reset);
        self.publish(&session)
    }

    /// Deliver one tick from a clock armed for `generation`
    pub async fn tick(&self, generation: u64) -> TickOutcome {
        let mut session = self.session.lock().await;
        let outcome = session.tick(generation).await;
        match outcome {
            TickOutcome::Ignored => {}
            TickOutcome::Counting(_) => {
                self.publish(&session);
            }
            TickOutcome::Finished => {
                info!("Time is up");
                self.record_action("finished");
                self.notify(SessionEvent::Finished);
                self.publish(&session);
            }
        }
        outcome
    }

    /// Tear the session down: cancel the tick and release audio
    pub async fn shutdown(&self) -> TimerSnapshot {
        self.notify(SessionEvent::Shutdown);
        let mut session = self.session.lock().await;
        session.shutdown().await;
        self.record_action("shutdown");
        self.publish(&session)
    }

    /// Get current session snapshot
    pub async fn get_snapshot(&self) -> TimerSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Current run generation of the session
    pub async fn get_generation(&self) -> u64 {
        self.session.lock().await.generation()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn notify(&self, event: SessionEvent) {
        // No receivers simply means no countdown task is attached
        if let Err(e) = self.event_tx.send(event) {
            warn!("No listener for session event: {}", e);
        }
    }

    fn publish(&self, session: &TimerSession) -> TimerSnapshot {
        let snapshot = session.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}
