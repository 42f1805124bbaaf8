//! Playback resilience integration tests
//!
//! Drive the controller through engine failures on a paused clock and
//! check the retry policy, error classification and stale-event
//! handling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use liveframe::player::Phase;
use liveframe::session::{EngineError, EngineEvent, MediaEvent};

use liveframe_integration_tests::{advance, fatal_network_error, PlayerFixture};

const STREAM_URL: &str = "https://x/stream.m3u8";

/// Clears the 5s error debounce window between fatal errors.
async fn clear_error_window(fixture: &mut PlayerFixture) {
    advance(Duration::from_millis(5100)).await;
    fixture.controller.process_pending();
}

#[tokio::test(start_paused = true)]
async fn manifest_and_fragment_events_make_stream_playable() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    assert_eq!(fixture.controller.state().phase, Phase::Loading);

    fixture.make_playable();
    assert_eq!(fixture.controller.state().phase, Phase::Ready);
    assert!(fixture.controller.state().can_play);
    assert!(fixture.controller.play().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn backoff_delays_follow_the_documented_sequence() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    assert_eq!(fixture.factory.created_count(), 1);

    for (attempt, delay_ms) in [1000u64, 2000, 4000, 8000, 10_000].iter().enumerate() {
        fixture.emit_engine(fatal_network_error("manifestLoadError"));
        assert_eq!(fixture.controller.state().retry_count, attempt as u32 + 1);

        // Not rebuilt just before the deadline
        advance(Duration::from_millis(delay_ms - 10)).await;
        fixture.controller.process_pending();
        assert_eq!(fixture.factory.created_count(), attempt + 1);

        // Rebuilt right after it
        advance(Duration::from_millis(20)).await;
        fixture.controller.process_pending();
        assert_eq!(fixture.factory.created_count(), attempt + 2);

        clear_error_window(&mut fixture).await;
    }
}

#[tokio::test(start_paused = true)]
async fn retry_budget_exhaustion_is_terminal() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);

    for _ in 0..5 {
        fixture.emit_engine(fatal_network_error("manifestLoadError"));
        // Let the pending retry fire and the window clear
        advance(Duration::from_secs(11)).await;
        fixture.controller.process_pending();
    }
    assert_eq!(fixture.controller.state().retry_count, 5);
    let engines_after_budget = fixture.factory.created_count();

    fixture.emit_engine(fatal_network_error("manifestLoadError"));
    assert_eq!(fixture.controller.state().phase, Phase::Error);
    let error = fixture.controller.state().last_error.clone().unwrap();
    assert!(error.message.contains("reset"));

    // No further automatic retry is scheduled
    advance(Duration::from_secs(60)).await;
    fixture.controller.process_pending();
    assert_eq!(fixture.factory.created_count(), engines_after_budget);
    assert_eq!(fixture.controller.state().phase, Phase::Error);
}

#[tokio::test(start_paused = true)]
async fn retry_entry_clears_the_previous_error() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);

    fixture.emit_engine(fatal_network_error("manifestLoadError"));
    assert_eq!(fixture.controller.state().phase, Phase::Error);
    assert!(fixture.controller.state().last_error.is_some());

    // Once the backoff timer fires the error no longer lingers into
    // the reconnect attempt
    advance(Duration::from_millis(1100)).await;
    fixture.controller.process_pending();
    assert_eq!(fixture.controller.state().phase, Phase::Loading);
    assert!(fixture.controller.state().last_error.is_none());
    assert_eq!(fixture.controller.state().retry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn reset_recovers_from_terminal_error() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);

    for _ in 0..6 {
        fixture.emit_engine(fatal_network_error("manifestLoadError"));
        advance(Duration::from_secs(11)).await;
        fixture.controller.process_pending();
    }
    assert_eq!(fixture.controller.state().phase, Phase::Error);

    fixture.controller.reset();
    fixture.controller.process_pending();
    assert_eq!(fixture.controller.state().phase, Phase::Loading);
    assert_eq!(fixture.controller.state().retry_count, 0);
    assert!(fixture.controller.state().last_error.is_none());

    fixture.make_playable();
    assert_eq!(fixture.controller.state().phase, Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn errors_within_debounce_window_do_not_restart_retry() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);

    fixture.emit_engine(fatal_network_error("manifestLoadError"));
    assert_eq!(fixture.controller.state().retry_count, 1);

    // A different fatal error right after is reported as instability,
    // not a second retry
    advance(Duration::from_millis(100)).await;
    fixture.emit_engine(fatal_network_error("fragLoadTimeOut"));
    assert_eq!(fixture.controller.state().retry_count, 1);
    let error = fixture.controller.state().last_error.clone().unwrap();
    assert!(error.message.contains("unstable"));
}

#[tokio::test(start_paused = true)]
async fn suppressed_engine_noise_changes_nothing() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();
    // Defined duration so snapshots compare cleanly
    fixture.surface.set_duration(100.0);
    fixture.controller.process_pending();

    let emissions = Arc::new(AtomicU32::new(0));
    let count = Arc::clone(&emissions);
    fixture
        .controller
        .on_state_change(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });

    let snapshot_before = fixture.controller.snapshot();
    fixture.emit_engine(EngineEvent::Error(EngineError {
        fatal: Some(false),
        details: Some("fragLoadTimeOut".to_string()),
        ..Default::default()
    }));

    assert_eq!(fixture.controller.snapshot(), snapshot_before);
    assert_eq!(emissions.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.controller.state().retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn stale_session_events_are_discarded() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    let old_id = fixture.controller.session_id().unwrap();

    // Rebuild the session; the old id is now stale
    fixture.controller.reset();
    fixture.controller.process_pending();
    fixture.make_playable();
    fixture.surface.set_duration(100.0);
    fixture.controller.process_pending();
    assert_ne!(fixture.controller.session_id(), Some(old_id));

    let snapshot_before = fixture.controller.snapshot();
    fixture
        .controller
        .handle_engine_event(old_id, fatal_network_error("manifestLoadError"));

    assert_eq!(fixture.controller.snapshot(), snapshot_before);
    assert_eq!(fixture.controller.state().retry_count, 0);
}

#[tokio::test(start_paused = true)]
async fn media_error_recovers_in_engine_before_retrying() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();

    fixture.emit_engine(EngineEvent::Error(EngineError {
        error_type: Some(liveframe::session::EngineErrorType::Media),
        details: Some("bufferAppendError".to_string()),
        fatal: Some(true),
        ..Default::default()
    }));

    assert_eq!(fixture.engine().recover_calls(), 1);
    assert_eq!(fixture.controller.state().retry_count, 0);
    assert_eq!(fixture.factory.created_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn end_of_stream_is_terminal_but_not_an_error() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();
    let engine = fixture.engine();

    fixture.emit_engine(EngineEvent::BufferEos);
    assert_eq!(fixture.controller.state().phase, Phase::Ended);
    assert!(fixture.controller.state().last_error.is_none());
    assert!(engine.is_destroyed());
}

#[tokio::test(start_paused = true)]
async fn live_edge_tracking_follows_duration_and_position() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();

    fixture.surface.set_duration(f64::INFINITY);
    fixture.controller.process_pending();
    assert!(fixture.controller.state().is_live_stream);

    fixture.surface.emit(MediaEvent::TimeUpdate {
        current_time: 95.0,
        duration: 100.0,
    });
    fixture.controller.process_pending();
    assert!(fixture.controller.state().is_at_live_edge);

    fixture.surface.emit(MediaEvent::TimeUpdate {
        current_time: 80.0,
        duration: 100.0,
    });
    fixture.controller.process_pending();
    assert!(!fixture.controller.state().is_at_live_edge);
}

#[tokio::test(start_paused = true)]
async fn native_events_mirror_into_phase() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();

    fixture.controller.play().await.unwrap();
    fixture.controller.process_pending();
    assert_eq!(fixture.controller.state().phase, Phase::Playing);

    fixture.controller.pause().await.unwrap();
    fixture.controller.process_pending();
    assert_eq!(fixture.controller.state().phase, Phase::Paused);
}

#[tokio::test(start_paused = true)]
async fn controls_auto_hide_while_playing() {
    let mut fixture = PlayerFixture::new();
    fixture.load(STREAM_URL);
    fixture.make_playable();

    fixture.controller.play().await.unwrap();
    fixture.controller.process_pending();
    assert!(fixture.controller.state().controls_visible);

    advance(Duration::from_millis(3100)).await;
    fixture.controller.process_pending();
    assert!(!fixture.controller.state().controls_visible);

    // Pausing brings them back and disarms the timer
    fixture.controller.pause().await.unwrap();
    fixture.controller.process_pending();
    assert!(fixture.controller.state().controls_visible);
    advance(Duration::from_secs(10)).await;
    fixture.controller.process_pending();
    assert!(fixture.controller.state().controls_visible);
}
