//! Terminal display of the remaining time

use std::{
    io::{self, Write},
    sync::Arc,
};
use tracing::{debug, warn};

use crate::state::{AppState, TimerSnapshot};

/// One display line for a snapshot
pub fn render_line(snapshot: &TimerSnapshot) -> String {
    let mut line = format!("{}  [{}]", snapshot.display, snapshot.run_state);
    if let Some(notice) = snapshot.notices.last() {
        line.push_str("  ! ");
        line.push_str(notice);
    }
    line
}

fn draw(line: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\r\x1b[2K{}", line)?;
    stdout.flush()
}

/// Background task that redraws the clock on stdout whenever it changes
pub async fn display_task(state: Arc<AppState>) {
    let mut snapshots = state.watch_snapshots();

    loop {
        let line = render_line(&snapshots.borrow_and_update());
        if let Err(e) = draw(&line) {
            warn!("Failed to draw display: {}", e);
        }

        if snapshots.changed().await.is_err() {
            debug!("Snapshot channel closed, display task exiting");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DurationSelection, RunState};

    #[test]
    fn test_render_idle_line() {
        assert_eq!(render_line(&TimerSnapshot::default()), "00:00:30  [idle]");
    }

    #[test]
    fn test_render_line_with_notice() {
        let snapshot = TimerSnapshot::new(
            RunState::Running,
            3661,
            DurationSelection::default(),
            false,
            vec!["Audio device not available: none".to_string()],
        );
        assert_eq!(
            render_line(&snapshot),
            "01:01:01  [running]  ! Audio device not available: none"
        );
    }
}
