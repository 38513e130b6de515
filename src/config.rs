//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc};
use clap::{Parser, ValueEnum};

use crate::{
    audio::{AudioBackend, AudioSessionOptions, CommandBackend, PlayerCommand, SilentBackend},
    state::DurationSelection,
};

/// Which audio backend plays the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Spawn an external player process
    Command,
    /// Decode and play in-process (requires the `rodio` feature)
    Rodio,
    /// No sound at all
    Silent,
}

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tune-timer")]
#[command(about = "A countdown timer that plays a looping track while it runs")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial hours selection
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u64).range(0..=11))]
    pub hours: u64,

    /// Initial minutes selection
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u64).range(0..=59))]
    pub minutes: u64,

    /// Initial seconds selection
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(0..=59))]
    pub seconds: u64,

    /// Track to loop while the timer runs
    #[arg(short, long, default_value = "assets/sample.wav")]
    pub track: PathBuf,

    /// Audio backend
    #[arg(short, long, value_enum, default_value = "command")]
    pub backend: BackendKind,

    /// External player used by the command backend (ffplay or mpv)
    #[arg(long, default_value = "ffplay")]
    pub player: String,

    /// Playback volume between 0.0 and 1.0
    #[arg(long, default_value = "1.0")]
    pub volume: f32,

    /// Start the countdown immediately
    #[arg(short, long)]
    pub autostart: bool,

    /// Draw the remaining time on the terminal
    #[arg(short, long)]
    pub display: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Duration selection from the initial picker flags
    pub fn selection(&self) -> DurationSelection {
        // clap has already enforced the picker ranges
        DurationSelection::unchecked(self.hours, self.minutes, self.seconds)
    }

    pub fn audio_options(&self) -> AudioSessionOptions {
        AudioSessionOptions::new(self.volume)
    }

    /// Build the configured audio backend
    pub fn audio_backend(&self) -> Result<Arc<dyn AudioBackend>, String> {
        match self.backend {
            BackendKind::Command => {
                let player = PlayerCommand::from_name(&self.player)
                    .ok_or_else(|| format!("Unknown player: {} (expected ffplay or mpv)", self.player))?;
                Ok(Arc::new(CommandBackend::new(player)))
            }
            BackendKind::Silent => Ok(Arc::new(SilentBackend::new())),
            #[cfg(feature = "rodio")]
            BackendKind::Rodio => Ok(Arc::new(crate::audio::RodioBackend::new())),
            #[cfg(not(feature = "rodio"))]
            BackendKind::Rodio => Err("tune-timer was built without the rodio feature".to_string()),
        }
    }
}
