//! Audio playback module
//!
//! The timer consumes playback as an opaque capability: configure the audio
//! session once, open a looping resource for a track, stop it, unload it.
//! Backends decide how the sound is actually produced.

pub mod command;
pub mod silent;
#[cfg(feature = "rodio")]
pub mod rodio_backend;

use std::{fmt, path::Path};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use command::{CommandBackend, PlayerCommand};
pub use silent::SilentBackend;
#[cfg(feature = "rodio")]
pub use rodio_backend::RodioBackend;

/// Errors reported by audio backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The audio session could not be configured
    #[error("Audio session configuration failed: {0}")]
    Configure(String),

    /// A looping playback resource could not be opened
    #[error("Audio playback failed to start: {0}")]
    Acquire(String),

    /// A playback resource could not be stopped or released
    #[error("Audio playback failed to stop: {0}")]
    Release(String),

    /// No audio output device available
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Opaque identifier for one open playback resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback#{}", self.0)
    }
}

/// Process-wide audio session options, applied once before any playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioSessionOptions {
    /// Playback volume in the range 0.0..=1.0
    pub volume: f32,
    /// Restart the track when it reaches the end
    pub loop_forever: bool,
}

impl AudioSessionOptions {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            loop_forever: true,
        }
    }
}

impl Default for AudioSessionOptions {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Playback capability consumed by the timer session
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Apply session-wide options. Called once at startup.
    async fn configure_session(&self, options: AudioSessionOptions) -> Result<(), AudioError>;

    /// Open a looping playback resource for `track` and start playing it
    async fn create_looping(&self, track: &Path) -> Result<PlaybackHandle, AudioError>;

    /// Halt playback. The resource stays allocated until `unload`.
    async fn stop(&self, handle: PlaybackHandle) -> Result<(), AudioError>;

    /// Release the resource. Unknown handles are ignored.
    async fn unload(&self, handle: PlaybackHandle) -> Result<(), AudioError>;
}
