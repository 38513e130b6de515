//! Run state and the snapshot published to observers

use std::fmt;
use serde::{Deserialize, Serialize};

use super::DurationSelection;
use crate::utils::format_hms;

/// Whether the countdown is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Initial state, and the state after completion or reset
    #[default]
    Idle,
    Running,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a timer session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub run_state: RunState,
    pub remaining_seconds: u64,
    /// Remaining time as `HH:MM:SS`
    pub display: String,
    pub selection: DurationSelection,
    /// Whether the duration pickers are shown
    pub editable: bool,
    /// Which trigger is offered: "start" or "reset"
    pub action: String,
    pub audio_active: bool,
    pub notices: Vec<String>,
}

impl TimerSnapshot {
    pub fn new(
        run_state: RunState,
        remaining_seconds: u64,
        selection: DurationSelection,
        audio_active: bool,
        notices: Vec<String>,
    ) -> Self {
        Self {
            run_state,
            remaining_seconds,
            display: format_hms(remaining_seconds),
            selection,
            editable: !run_state.is_running(),
            action: if run_state.is_running() { "reset" } else { "start" }.to_string(),
            audio_active,
            notices,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        let selection = DurationSelection::default();
        Self::new(RunState::Idle, selection.total_seconds(), selection, false, Vec::new())
    }
}
