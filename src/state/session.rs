//! Countdown session: the Idle/Running state machine and its audio side effects

use std::{path::PathBuf, sync::Arc};
use tracing::{debug, error, info, warn};

use super::{
    duration::DEFAULT_SECONDS, DurationSelection, RunState, TimerSnapshot,
};
use crate::{
    audio::{AudioBackend, AudioError, AudioSessionOptions, PlaybackHandle},
    error::TimerError,
};

/// Result of delivering one tick to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was idle; nothing changed
    Ignored,
    /// Still running with this many seconds left
    Counting(u64),
    /// The countdown reached zero and the session went idle
    Finished,
}

/// Owns at most one looping playback resource for the bundled track
pub struct AudioController {
    backend: Arc<dyn AudioBackend>,
    track: PathBuf,
    handle: Option<PlaybackHandle>,
}

impl AudioController {
    pub fn new(backend: Arc<dyn AudioBackend>, track: PathBuf) -> Self {
        Self {
            backend,
            track,
            handle: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Open a new looping resource. The caller releases any previous one first.
    async fn acquire(&mut self) -> Result<PlaybackHandle, AudioError> {
        let handle = self.backend.create_looping(&self.track).await?;
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Stop and unload the current resource, if any.
    ///
    /// The handle is cleared even when the backend reports a failure.
    async fn release(&mut self) -> Result<(), AudioError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let stopped = self.backend.stop(handle).await;
        let unloaded = self.backend.unload(handle).await;
        debug!("Released {}", handle);
        stopped.and(unloaded)
    }
}

/// A single countdown timer with looping music
pub struct TimerSession {
    selection: DurationSelection,
    remaining_seconds: u64,
    run_state: RunState,
    audio: AudioController,
    notices: Vec<String>,
    /// Bumped by every start, reset and shutdown; ticks armed for an older
    /// run are ignored
    generation: u64,
}

impl TimerSession {
    /// Create an idle session showing the default 30 seconds
    pub fn new(backend: Arc<dyn AudioBackend>, track: impl Into<PathBuf>) -> Self {
        Self {
            selection: DurationSelection::default(),
            remaining_seconds: DEFAULT_SECONDS,
            run_state: RunState::Idle,
            audio: AudioController::new(backend, track.into()),
            notices: Vec::new(),
            generation: 0,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn selection(&self) -> DurationSelection {
        self.selection
    }

    pub fn audio_active(&self) -> bool {
        self.audio.is_active()
    }

    /// Identifies the current run for the countdown clock
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(
            self.run_state,
            self.remaining_seconds,
            self.selection,
            self.audio.is_active(),
            self.notices.clone(),
        )
    }

    /// Apply the process-wide audio options. Failures only produce a notice.
    pub async fn configure_audio(&mut self, options: AudioSessionOptions) {
        match self.audio.backend.configure_session(options).await {
            Ok(()) => info!("Audio session configured with {} backend", self.audio.backend_name()),
            Err(e) => {
                error!("Error setting audio mode: {}", e);
                self.add_notice(e.to_string());
            }
        }
    }

    /// Store the duration to use on the next start
    pub fn configure(&mut self, selection: DurationSelection) -> Result<(), TimerError> {
        if self.run_state.is_running() {
            return Err(TimerError::NotIdle);
        }
        debug!("Duration set to {:?}", selection);
        self.selection = selection;
        Ok(())
    }

    /// Begin counting down from the configured duration.
    ///
    /// Returns the number of seconds on the clock. Starting while running
    /// restarts the countdown and the track.
    pub async fn start(&mut self) -> Result<u64, TimerError> {
        let total = self.selection.total_seconds();
        if total == 0 {
            warn!("Refusing to start a zero-length countdown");
            return Err(TimerError::InvalidDuration);
        }

        self.remaining_seconds = total;
        self.run_state = RunState::Running;
        self.generation += 1;
        info!("Countdown started for {} seconds", total);

        self.start_audio().await;
        Ok(total)
    }

    /// Advance the countdown by one second.
    ///
    /// `generation` is the run the clock was armed for; a tick from an
    /// earlier run changes nothing.
    pub async fn tick(&mut self, generation: u64) -> TickOutcome {
        if !self.run_state.is_running() {
            return TickOutcome::Ignored;
        }
        if generation != self.generation {
            debug!("Dropping tick for run {} (current run {})", generation, self.generation);
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            debug!("Tick: {} seconds left", self.remaining_seconds);
            return TickOutcome::Counting(self.remaining_seconds);
        }

        self.run_state = RunState::Idle;
        info!("Countdown finished");
        self.stop_audio().await;
        TickOutcome::Finished
    }

    /// Return to the idle state with default values and silence the track
    pub async fn reset(&mut self) {
        self.run_state = RunState::Idle;
        self.remaining_seconds = DEFAULT_SECONDS;
        self.selection = DurationSelection::default();
        self.generation += 1;
        info!("Timer reset");
        self.stop_audio().await;
    }

    /// Tear the session down: stop counting and release any audio
    pub async fn shutdown(&mut self) {
        if self.run_state.is_running() {
            info!("Stopping countdown with {} seconds left", self.remaining_seconds);
        }
        self.run_state = RunState::Idle;
        self.generation += 1;
        self.stop_audio().await;
    }

    /// Record a user-visible notice
    pub fn add_notice(&mut self, notice: String) {
        warn!("Adding notice: {}", notice);
        self.notices.push(notice);
    }

    /// Drop notices mentioning a component
    pub fn clear_notices_for(&mut self, component: &str) {
        let initial_count = self.notices.len();
        let component = component.to_lowercase();
        self.notices.retain(|notice| !notice.to_lowercase().contains(&component));

        if self.notices.len() != initial_count {
            debug!("Cleared {} notices for {}", initial_count - self.notices.len(), component);
        }
    }

    async fn start_audio(&mut self) {
        // At most one resource: the old one is fully released before acquiring
        self.stop_audio().await;

        match self.audio.acquire().await {
            Ok(handle) => {
                self.clear_notices_for("audio");
                info!("Music started ({})", handle);
            }
            Err(e) => {
                error!("Error loading or playing sound: {}", e);
                self.add_notice(e.to_string());
            }
        }
    }

    async fn stop_audio(&mut self) {
        if let Err(e) = self.audio.release().await {
            error!("Error stopping sound: {}", e);
            self.add_notice(e.to_string());
        }
    }
}
