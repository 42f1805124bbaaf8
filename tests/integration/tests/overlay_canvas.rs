//! Overlay drag round trip against the in-memory store
//!
//! Exercises the full pointer-to-persistence path on a surface larger
//! than the reference frame, where screen and stored units differ.

use std::sync::Arc;
use std::time::Duration;

use liveframe::overlay::{
    MemoryOverlayStore, Overlay, OverlayCanvas, OverlayStore, SurfaceSize,
};
use liveframe::utils::config::OverlayConfig;

use liveframe_integration_tests::advance;

// Twice the reference frame on both axes
const SURFACE: SurfaceSize = SurfaceSize {
    width: 1600.0,
    height: 900.0,
};

async fn canvas() -> (OverlayCanvas, Arc<MemoryOverlayStore>, String) {
    let store = Arc::new(MemoryOverlayStore::new());
    let mut canvas = OverlayCanvas::new(
        Arc::clone(&store) as Arc<dyn OverlayStore>,
        SURFACE,
        OverlayConfig::default(),
    );
    let created = canvas.create_overlay(Overlay::text("scoreboard")).await.unwrap();
    let id = created.id.clone().unwrap();
    (canvas, store, id)
}

#[tokio::test(start_paused = true)]
async fn drag_persists_reference_units_not_pixels() {
    let (mut canvas, store, id) = canvas().await;

    // Overlay stored at (50, 50) projects to (100, 100) on this
    // surface
    assert!(canvas.pointer_down(&id, 100.0, 100.0));
    canvas.pointer_move(400.0, 300.0);
    canvas.pointer_up();

    advance(Duration::from_millis(310)).await;

    let log = store.update_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, id);
    // Screen (400, 300) back in reference units
    assert_eq!(log[0].1.x, Some(200.0));
    assert_eq!(log[0].1.y, Some(150.0));
    // Only position is patched
    assert!(log[0].1.width.is_none());
    assert!(log[0].1.content.is_none());
}

#[tokio::test(start_paused = true)]
async fn clamp_applies_in_screen_space() {
    let (mut canvas, store, id) = canvas().await;

    assert!(canvas.pointer_down(&id, 100.0, 100.0));
    canvas.pointer_move(99_999.0, 99_999.0);
    canvas.pointer_up();

    advance(Duration::from_millis(310)).await;

    let log = store.update_log();
    assert_eq!(log.len(), 1);
    // Screen clamp (1600-50, 900-20) converted to reference units
    assert_eq!(log[0].1.x, Some(775.0));
    assert_eq!(log[0].1.y, Some(440.0));
}

#[tokio::test(start_paused = true)]
async fn a_full_drag_burst_persists_once() {
    let (mut canvas, store, id) = canvas().await;

    assert!(canvas.pointer_down(&id, 100.0, 100.0));
    for step in 1..=20 {
        canvas.pointer_move(100.0 + step as f32 * 5.0, 100.0);
        advance(Duration::from_millis(15)).await;
    }
    canvas.pointer_up();

    // Release does not flush early; the debounce window still applies
    let halfway = store.update_log();
    assert!(halfway.is_empty());

    advance(Duration::from_millis(310)).await;
    let log = store.update_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].1.x, Some(100.0));
}
