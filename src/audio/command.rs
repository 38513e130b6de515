//! Playback through an external looping player process

use std::{
    collections::HashMap,
    path::Path,
    process::Stdio,
    sync::atomic::{AtomicU64, Ordering},
};
use async_trait::async_trait;
use tokio::{
    process::{Child, Command},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use super::{AudioBackend, AudioError, AudioSessionOptions, PlaybackHandle};

const TRACK_PLACEHOLDER: &str = "{track}";
const VOLUME_PLACEHOLDER: &str = "{volume}";

/// How to launch the external player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    /// Arguments; `{track}` and `{volume}` (0-100) are substituted at launch
    pub args: Vec<String>,
}

impl PlayerCommand {
    pub fn ffplay() -> Self {
        Self {
            program: "ffplay".to_string(),
            args: ["-nodisp", "-loglevel", "quiet", "-loop", "0", "-volume", VOLUME_PLACEHOLDER, TRACK_PLACEHOLDER]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn mpv() -> Self {
        Self {
            program: "mpv".to_string(),
            args: vec![
                "--no-video".to_string(),
                "--really-quiet".to_string(),
                "--loop-file=inf".to_string(),
                format!("--volume={}", VOLUME_PLACEHOLDER),
                TRACK_PLACEHOLDER.to_string(),
            ],
        }
    }

    // Method to get a preset by player name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ffplay" => Some(Self::ffplay()),
            "mpv" => Some(Self::mpv()),
            _ => None,
        }
    }

    /// Arguments with placeholders filled in
    pub fn render_args(&self, track: &Path, volume: f32) -> Vec<String> {
        let track = track.display().to_string();
        let volume = ((volume.clamp(0.0, 1.0) * 100.0).round() as u32).to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(TRACK_PLACEHOLDER, &track).replace(VOLUME_PLACEHOLDER, &volume))
            .collect()
    }
}

/// Backend that spawns one player process per playback resource
#[derive(Debug)]
pub struct CommandBackend {
    player: PlayerCommand,
    volume: Mutex<f32>,
    next_id: AtomicU64,
    children: Mutex<HashMap<PlaybackHandle, Child>>,
}

impl CommandBackend {
    pub fn new(player: PlayerCommand) -> Self {
        Self {
            player,
            volume: Mutex::new(1.0),
            next_id: AtomicU64::new(0),
            children: Mutex::new(HashMap::new()),
        }
    }

    pub fn player(&self) -> &PlayerCommand {
        &self.player
    }

    /// Kill a player process and reap it
    async fn terminate(handle: PlaybackHandle, child: &mut Child) -> Result<(), AudioError> {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("{} already exited ({})", handle, status);
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => return Err(AudioError::Release(format!("Failed to poll {}: {}", handle, e))),
        }

        child
            .start_kill()
            .map_err(|e| AudioError::Release(format!("Failed to kill {}: {}", handle, e)))?;
        child
            .wait()
            .await
            .map_err(|e| AudioError::Release(format!("Failed to reap {}: {}", handle, e)))?;

        debug!("{} terminated", handle);
        Ok(())
    }
}

#[async_trait]
impl AudioBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.player.program
    }

    async fn configure_session(&self, options: AudioSessionOptions) -> Result<(), AudioError> {
        if !options.loop_forever {
            warn!("{} always loops the track; loop_forever=false is ignored", self.player.program);
        }
        *self.volume.lock().await = options.volume;

        // Make sure the player can be launched at all
        Command::new(&self.player.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| AudioError::Configure(format!("{} is not available: {}", self.player.program, e)))?;

        info!("Audio player {} is available", self.player.program);
        Ok(())
    }

    async fn create_looping(&self, track: &Path) -> Result<PlaybackHandle, AudioError> {
        if !track.exists() {
            return Err(AudioError::Acquire(format!("Track not found: {}", track.display())));
        }

        let volume = *self.volume.lock().await;
        let args = self.player.render_args(track, volume);
        debug!("Launching {} {:?}", self.player.program, args);

        let child = Command::new(&self.player.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AudioError::Acquire(format!("Failed to launch {}: {}", self.player.program, e)))?;

        let handle = PlaybackHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.children.lock().await.insert(handle, child);

        info!("{} playing {} in a loop", handle, track.display());
        Ok(handle)
    }

    async fn stop(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        let mut children = self.children.lock().await;
        match children.get_mut(&handle) {
            Some(child) => Self::terminate(handle, child).await,
            None => Ok(()),
        }
    }

    async fn unload(&self, handle: PlaybackHandle) -> Result<(), AudioError> {
        let child = self.children.lock().await.remove(&handle);
        match child {
            Some(mut child) => {
                Self::terminate(handle, &mut child).await?;
                debug!("{} unloaded", handle);
                Ok(())
            }
            None => Ok(()),
        }
    }
}
