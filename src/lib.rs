//! Tune Timer - A countdown timer that plays a looping track while it runs
//!
//! This library provides the countdown state machine, the audio playback
//! backends it drives, and the HTTP control surface around them.

pub mod config;
pub mod error;
pub mod audio;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimerSession};
pub use api::create_router;
pub use utils::{format_hms, signals::shutdown_signal};
