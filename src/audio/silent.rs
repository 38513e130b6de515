//! Backend that produces no sound

use std::{
    collections::HashSet,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};
use async_trait::async_trait;
use tracing::debug;

use super::{AudioBackend, AudioError, AudioSessionOptions, PlaybackHandle};

/// Counters describing what a `SilentBackend` has been asked to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub configured: u64,
    pub created: u64,
    pub stopped: u64,
    pub unloaded: u64,
    pub open: usize,
    /// Highest number of resources open at the same time
    pub peak_open: usize,
}

/// Headless backend: tracks resources like a real player but stays quiet
#[derive(Debug, Default)]
pub struct SilentBackend {
    next_id: AtomicU64,
    inner: Mutex<SilentInner>,
}

#[derive(Debug, Default)]
struct SilentInner {
    open: HashSet<PlaybackHandle>,
    stats: PlaybackStats,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the call counters
    pub fn stats(&self) -> PlaybackStats {
        self.inner
            .lock()
            .map(|inner| inner.stats)
            .unwrap_or_default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut SilentInner) -> T) -> Result<T, AudioError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| AudioError::DeviceNotAvailable(format!("Failed to lock silent backend: {}", e)))?;
        Ok(f(&mut inner))
    }
}

#[async_trait]
impl AudioBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    async fn configure_session(&self, options: AudioSessionOptions) -> Result<(), AudioError> {
        debug!("Silent backend configured: {:?}", options);
        self.with_inner(|inner| inner.stats.configured += 1)
    }

    async fn create_looping(&self, track: &Path) -> Result<PlaybackHandle, AudioError> {
        let handle = PlaybackHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        debug!("Silent backend opened {} for {}", handle, track.display());
        self.with_inner(|inner| {
            inner.open.insert(handle);
            inner.stats.created += 1;
            inner.stats.open = inner.open.len();
            inner.stats.peak_open = inner.stats.peak_open.max(inner.open.len());
        })?;
        Ok(handle)
    }

    async fn stop(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        self.with_inner(|inner| {
            if inner.open.contains(&handle) {
                inner.stats.stopped += 1;
            }
        })
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        self.with_inner(|inner| {
            if inner.open.remove(&handle) {
                inner.stats.unloaded += 1;
                inner.stats.open = inner.open.len();
            }
        })
    }
}
