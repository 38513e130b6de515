//! Duration selection made with the three pickers

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Highest value offered by the hours picker
pub const MAX_HOURS: u64 = 11;
/// Highest value offered by the minutes and seconds pickers
pub const MAX_MINUTES: u64 = 59;
pub const MAX_SECONDS: u64 = 59;

/// Remaining time shown before anything is started, and after a reset
pub const DEFAULT_SECONDS: u64 = 30;

/// Hours, minutes and seconds chosen before starting the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSelection {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationSelection {
    /// Build a selection, enforcing the picker ranges
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Result<Self, TimerError> {
        check_range("hours", hours, MAX_HOURS)?;
        check_range("minutes", minutes, MAX_MINUTES)?;
        check_range("seconds", seconds, MAX_SECONDS)?;
        Ok(Self::unchecked(hours, minutes, seconds))
    }

    /// Build a selection without picker range checks
    pub fn unchecked(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self { hours, minutes, seconds }
    }

    /// Total length of the countdown in seconds
    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

impl Default for DurationSelection {
    fn default() -> Self {
        Self::unchecked(0, 0, DEFAULT_SECONDS)
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), TimerError> {
    if value > max {
        return Err(TimerError::OutOfRange { field, value, max });
    }
    Ok(())
}

/// Values offered by each picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerRanges {
    pub hours: Vec<u64>,
    pub minutes: Vec<u64>,
    pub seconds: Vec<u64>,
}

impl PickerRanges {
    pub fn new() -> Self {
        Self {
            hours: (0..=MAX_HOURS).collect(),
            minutes: (0..=MAX_MINUTES).collect(),
            seconds: (0..=MAX_SECONDS).collect(),
        }
    }
}

impl Default for PickerRanges {
    fn default() -> Self {
        Self::new()
    }
}
