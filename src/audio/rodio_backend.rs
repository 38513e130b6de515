//! In-process playback through rodio
//!
//! rodio's output stream is not `Send`, so every playback resource gets its
//! own audio thread that owns the stream and sink until told to stop.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc, Mutex,
    },
    thread::JoinHandle,
};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::{AudioBackend, AudioError, AudioSessionOptions, PlaybackHandle};

struct Voice {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: JoinHandle<()>,
}

/// Backend that decodes and plays the track on a dedicated audio thread
pub struct RodioBackend {
    options: Mutex<AudioSessionOptions>,
    next_id: AtomicU64,
    voices: Mutex<HashMap<PlaybackHandle, Voice>>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self {
            options: Mutex::new(AudioSessionOptions::default()),
            next_id: AtomicU64::new(0),
            voices: Mutex::new(HashMap::new()),
        }
    }

    fn play_until_stopped(
        track: PathBuf,
        volume: f32,
        ready_tx: oneshot::Sender<Result<(), AudioError>>,
        stop_rx: mpsc::Receiver<()>,
    ) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(output) => output,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::DeviceNotAvailable(e.to_string())));
                return;
            }
        };
        let sink = match Sink::try_new(&stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::Acquire(format!("Failed to create sink: {}", e))));
                return;
            }
        };
        let file = match File::open(&track) {
            Ok(file) => file,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::Acquire(format!("Failed to open {}: {}", track.display(), e))));
                return;
            }
        };
        let source = match Decoder::new_looped(BufReader::new(file)) {
            Ok(source) => source,
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::Acquire(format!("Failed to decode {}: {}", track.display(), e))));
                return;
            }
        };

        sink.set_volume(volume);
        sink.append(source);
        let _ = ready_tx.send(Ok(()));

        // Sender dropped counts as a stop request too
        let _ = stop_rx.recv();
        sink.stop();
    }

    fn take_voice(&self, handle: PlaybackHandle) -> Result<Option<Voice>, AudioError> {
        self.voices
            .lock()
            .map(|mut voices| voices.remove(&handle))
            .map_err(|e| AudioError::Release(format!("Failed to lock voices: {}", e)))
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioBackend for RodioBackend {
    fn name(&self) -> &str {
        "rodio"
    }

    async fn configure_session(&self, options: AudioSessionOptions) -> Result<(), AudioError> {
        let mut current = self
            .options
            .lock()
            .map_err(|e| AudioError::Configure(format!("Failed to lock options: {}", e)))?;
        *current = options;
        info!("rodio session configured: volume={:.2}", options.volume);
        Ok(())
    }

    async fn create_looping(&self, track: &Path) -> Result<PlaybackHandle, AudioError> {
        let volume = self
            .options
            .lock()
            .map(|options| options.volume)
            .map_err(|e| AudioError::Acquire(format!("Failed to lock options: {}", e)))?;

        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = mpsc::channel();
        let track = track.to_path_buf();

        let thread = std::thread::Builder::new()
            .name("tune-timer-audio".to_string())
            .spawn(move || Self::play_until_stopped(track, volume, ready_tx, stop_rx))
            .map_err(|e| AudioError::Acquire(format!("Failed to spawn audio thread: {}", e)))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(AudioError::Acquire("Audio thread exited before playback".to_string())),
        }

        let handle = PlaybackHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.voices
            .lock()
            .map_err(|e| AudioError::Acquire(format!("Failed to lock voices: {}", e)))?
            .insert(handle, Voice { stop_tx: Some(stop_tx), thread });

        debug!("{} started on rodio", handle);
        Ok(handle)
    }

    async fn stop(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        let mut voices = self
            .voices
            .lock()
            .map_err(|e| AudioError::Release(format!("Failed to lock voices: {}", e)))?;
        if let Some(stop_tx) = voices.get_mut(&handle).and_then(|voice| voice.stop_tx.take()) {
            let _ = stop_tx.send(());
        }
        Ok(())
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        let Some(voice) = self.take_voice(handle)? else {
            return Ok(());
        };
        drop(voice.stop_tx);

        tokio::task::spawn_blocking(move || voice.thread.join())
            .await
            .map_err(|e| AudioError::Release(format!("Failed to join audio thread: {}", e)))?
            .map_err(|_| AudioError::Release(format!("Audio thread for {} panicked", handle)))?;

        debug!("{} unloaded", handle);
        Ok(())
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        if let Ok(mut voices) = self.voices.lock() {
            if !voices.is_empty() {
                warn!("Dropping rodio backend with {} open voices", voices.len());
            }
            // Dropping the senders wakes every audio thread
            voices.clear();
        }
    }
}
