//! State management module
//!
//! This module contains the countdown state machine and the application
//! state that shares it with the HTTP API and background tasks.

pub mod app_state;
pub mod duration;
pub mod run_state;
pub mod session;

// Re-export main types
pub use app_state::{AppState, SessionEvent};
pub use duration::{DurationSelection, PickerRanges};
pub use run_state::{RunState, TimerSnapshot};
pub use session::{AudioController, TickOutcome, TimerSession};
