//! Countdown background task: the one-second clock

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::state::{AppState, SessionEvent, TickOutcome};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to the spawned countdown task
pub struct CountdownTask {
    handle: JoinHandle<()>,
}

impl CountdownTask {
    /// Subscribe to session events and spawn the countdown task.
    ///
    /// The subscription happens before this returns, so a start issued right
    /// after spawning is never missed.
    pub fn spawn(state: Arc<AppState>) -> Self {
        let events = state.subscribe();
        let handle = tokio::spawn(countdown_task(state, events));
        Self { handle }
    }

    /// Wait for the task to exit after a shutdown event, aborting it if it
    /// does not stop within a second
    pub async fn stop(self) {
        let abort = self.handle.abort_handle();
        match tokio::time::timeout(Duration::from_secs(1), self.handle).await {
            Ok(Ok(())) => debug!("Countdown task stopped"),
            Ok(Err(e)) if e.is_cancelled() => debug!("Countdown task cancelled"),
            Ok(Err(e)) => error!("Countdown task failed: {}", e),
            Err(_) => {
                warn!("Countdown task did not stop in time, aborting");
                abort.abort();
            }
        }
    }
}

enum Wake {
    Tick(u64),
    Event(Result<SessionEvent, RecvError>),
}

/// Fresh one-second interval whose first tick is one period away
fn arm() -> Interval {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Background task that ticks the session once per second while it runs
pub async fn countdown_task(state: Arc<AppState>, mut events: broadcast::Receiver<SessionEvent>) {
    info!("Starting countdown task");

    // The armed interval and the run it belongs to, while the session runs
    let mut clock: Option<(Interval, u64)> = None;

    loop {
        let wake = match clock.as_mut() {
            None => Wake::Event(events.recv().await),
            Some((interval, generation)) => {
                let generation = *generation;
                tokio::select! {
                    // Events first so a restart re-arms before a stale tick lands
                    biased;
                    event = events.recv() => Wake::Event(event),
                    _ = interval.tick() => Wake::Tick(generation),
                }
            }
        };

        let event = match wake {
            Wake::Tick(generation) => {
                match state.tick(generation).await {
                    TickOutcome::Counting(remaining) => {
                        debug!("{} seconds remaining", remaining);
                    }
                    TickOutcome::Finished => {
                        info!("Countdown complete, disarming clock");
                        clock = None;
                    }
                    TickOutcome::Ignored => {
                        // A pending Started event re-arms for the new run
                        debug!("Tick belongs to a finished run, disarming clock");
                        clock = None;
                    }
                }
                continue;
            }
            Wake::Event(event) => event,
        };

        match event {
            Ok(SessionEvent::Started { total_seconds, generation }) => {
                info!("Arming countdown clock for {} seconds (run {})", total_seconds, generation);
                clock = Some((arm(), generation));
            }
            Ok(SessionEvent::Finished) | Ok(SessionEvent::Reset) => {
                if clock.take().is_some() {
                    debug!("Countdown clock disarmed");
                }
            }
            Ok(SessionEvent::Shutdown) => {
                info!("Countdown task shutting down");
                break;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Countdown task missed {} session events, resyncing", skipped);
                let (running, generation) = {
                    let session = state.session.lock().await;
                    (session.run_state().is_running(), session.generation())
                };
                clock = if running { Some((arm(), generation)) } else { None };
            }
            Err(RecvError::Closed) => {
                error!("Session event channel closed");
                break;
            }
        }
    }
}
