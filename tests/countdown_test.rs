//! Countdown task driven by a paused tokio clock

mod common;

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};
use tokio::time::sleep;

use common::{silent_app, FlakyBackend, SlowRestartBackend, TRACK};
use tune_timer::{
    audio::AudioSessionOptions,
    state::{AppState, DurationSelection, RunState},
    tasks::CountdownTask,
    TimerError,
};

#[tokio::test(start_paused = true)]
async fn test_countdown_runs_to_completion() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 3).unwrap()).await.unwrap();
    state.start().await.unwrap();

    sleep(Duration::from_millis(1500)).await;
    let snapshot = state.get_snapshot().await;
    assert_eq!(snapshot.remaining_seconds, 2);
    assert_eq!(snapshot.run_state, RunState::Running);

    sleep(Duration::from_secs(2)).await;
    let snapshot = state.get_snapshot().await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.remaining_seconds, 0);
    assert_eq!(snapshot.display, "00:00:00");
    assert!(!snapshot.audio_active);
    assert_eq!(backend.stats().created, 1);
    assert_eq!(backend.stats().unloaded, 1);

    // The clock stays quiet once idle
    sleep(Duration::from_secs(5)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 0);
    assert_eq!(backend.stats().unloaded, 1);

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_thirty_second_default_releases_audio_once() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    let snapshot = state.start().await.unwrap();
    assert_eq!(snapshot.remaining_seconds, 30);
    assert_eq!(snapshot.run_state, RunState::Running);

    sleep(Duration::from_millis(30_500)).await;
    let snapshot = state.get_snapshot().await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.remaining_seconds, 0);
    assert_eq!(backend.stats().unloaded, 1);
    assert_eq!(backend.stats().open, 0);

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_stops_the_clock() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 10).unwrap()).await.unwrap();
    state.start().await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 8);

    let snapshot = state.reset().await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.remaining_seconds, 30);
    assert_eq!(snapshot.selection, DurationSelection::default());
    assert_eq!(backend.stats().open, 0);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 30);

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_restart_rearms_the_clock() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 10).unwrap()).await.unwrap();
    state.start().await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 8);

    state.start().await.unwrap();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 10);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 9);
    assert_eq!(backend.stats().peak_open, 1);

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_tick_and_releases_audio() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.start().await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    let snapshot = state.shutdown().await;
    countdown.stop().await;

    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(backend.stats().open, 0);

    let remaining = state.get_snapshot().await.remaining_seconds;
    sleep(Duration::from_secs(3)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, remaining);
}

#[tokio::test(start_paused = true)]
async fn test_zero_duration_never_arms_the_clock() {
    let (state, backend) = silent_app();
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 0).unwrap()).await.unwrap();
    assert_eq!(state.start().await, Err(TimerError::InvalidDuration));

    sleep(Duration::from_secs(3)).await;
    let snapshot = state.get_snapshot().await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.remaining_seconds, 30);
    assert_eq!(backend.stats().created, 0);

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_audio_failure_does_not_block_countdown() {
    let backend = Arc::new(FlakyBackend::new());
    backend.fail_create.store(true, Ordering::SeqCst);
    let state = Arc::new(AppState::with_backend(backend.clone(), TRACK));
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 2).unwrap()).await.unwrap();
    let snapshot = state.start().await.unwrap();
    assert_eq!(snapshot.run_state, RunState::Running);
    assert!(!snapshot.audio_active);
    assert_eq!(snapshot.notices.len(), 1);
    assert!(snapshot.notices[0].contains("decoder exploded"));

    sleep(Duration::from_millis(2500)).await;
    let snapshot = state.get_snapshot().await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.remaining_seconds, 0);
    assert_eq!(backend.unloaded(), 0);

    // Another failed attempt keeps the earlier notice
    let snapshot = state.start().await.unwrap();
    assert!(!snapshot.audio_active);
    assert_eq!(snapshot.notices.len(), 2);

    // A later successful acquisition clears the stale audio notices
    backend.fail_create.store(false, Ordering::SeqCst);
    let snapshot = state.start().await.unwrap();
    assert!(snapshot.audio_active);
    assert!(snapshot.notices.is_empty());

    state.shutdown().await;
    countdown.stop().await;
}

#[tokio::test]
async fn test_release_failure_still_clears_handle() {
    let backend = Arc::new(FlakyBackend::new());
    let state = AppState::with_backend(backend.clone(), TRACK);

    state.start().await.unwrap();
    backend.fail_stop.store(true, Ordering::SeqCst);

    let snapshot = state.reset().await;
    assert!(!snapshot.audio_active);
    assert_eq!(snapshot.notices.len(), 1);
    assert!(snapshot.notices[0].contains("device vanished"));
    assert_eq!(backend.unloaded(), 1);

    // Second stop has nothing to release and reports nothing new
    let snapshot = state.reset().await;
    assert_eq!(snapshot.notices.len(), 1);
    assert_eq!(backend.unloaded(), 1);
}

#[tokio::test]
async fn test_configure_failure_is_a_notice() {
    let backend = Arc::new(FlakyBackend::new());
    backend.fail_configure.store(true, Ordering::SeqCst);
    let state = AppState::with_backend(backend, TRACK);

    let snapshot = state.configure_audio(AudioSessionOptions::default()).await;
    assert_eq!(snapshot.run_state, RunState::Idle);
    assert_eq!(snapshot.notices.len(), 1);
    assert!(snapshot.notices[0].starts_with("Audio session configuration failed"));
}

#[tokio::test(start_paused = true)]
async fn test_restart_during_slow_acquire_keeps_full_second() {
    let backend = Arc::new(SlowRestartBackend::new(Duration::from_millis(300)));
    let state = Arc::new(AppState::with_backend(backend, TRACK));
    let countdown = CountdownTask::spawn(Arc::clone(&state));

    state.set_duration(DurationSelection::new(0, 0, 10).unwrap()).await.unwrap();
    state.start().await.unwrap();
    sleep(Duration::from_millis(900)).await;

    // The old clock fires at 1s while the restart is still acquiring audio
    let snapshot = state.start().await.unwrap();
    assert_eq!(snapshot.remaining_seconds, 10);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 10);

    // First tick of the new run lands one second after the restart finished
    sleep(Duration::from_secs(1)).await;
    assert_eq!(state.get_snapshot().await.remaining_seconds, 9);

    state.shutdown().await;
    countdown.stop().await;
}
