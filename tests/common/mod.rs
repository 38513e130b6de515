//! Shared helpers for integration tests

#![allow(dead_code)]

use std::{
    path::Path,
    time::Duration,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};
use async_trait::async_trait;

use tune_timer::{
    audio::{AudioBackend, AudioError, AudioSessionOptions, PlaybackHandle, SilentBackend},
    state::AppState,
};

pub const TRACK: &str = "assets/sample.wav";

pub fn silent_app() -> (Arc<AppState>, Arc<SilentBackend>) {
    let backend = Arc::new(SilentBackend::new());
    let state = Arc::new(AppState::with_backend(backend.clone(), TRACK));
    (state, backend)
}

/// Backend whose operations can be told to fail
#[derive(Default)]
pub struct FlakyBackend {
    pub fail_configure: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_stop: AtomicBool,
    pub created: AtomicU64,
    pub unloaded: AtomicU64,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn unloaded(&self) -> u64 {
        self.unloaded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioBackend for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn configure_session(&self, _options: AudioSessionOptions) -> Result<(), AudioError> {
        if self.fail_configure.load(Ordering::SeqCst) {
            return Err(AudioError::Configure("no audio session".to_string()));
        }
        Ok(())
    }

    async fn create_looping(&self, _track: &Path) -> Result<PlaybackHandle, AudioError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AudioError::Acquire("decoder exploded".to_string()));
        }
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PlaybackHandle::new(id))
    }

    async fn stop(&self, _handle: PlaybackHandle) -> Result<(), AudioError> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(AudioError::Release("device vanished".to_string()));
        }
        Ok(())
    }

    async fn unload(&self, _handle: PlaybackHandle) -> Result<(), AudioError> {
        self.unloaded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend whose every acquisition after the first takes `delay`
pub struct SlowRestartBackend {
    delay: Duration,
    created: AtomicU64,
}

impl SlowRestartBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            created: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl AudioBackend for SlowRestartBackend {
    fn name(&self) -> &str {
        "slow-restart"
    }

    async fn configure_session(&self, _options: AudioSessionOptions) -> Result<(), AudioError> {
        Ok(())
    }

    async fn create_looping(&self, _track: &Path) -> Result<PlaybackHandle, AudioError> {
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        if id > 1 {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PlaybackHandle::new(id))
    }

    async fn stop(&self, _handle: PlaybackHandle) -> Result<(), AudioError> {
        Ok(())
    }

    async fn unload(&self, _handle: PlaybackHandle) -> Result<(), AudioError> {
        Ok(())
    }
}
