//! Overlay canvas: shadow copy, drag handling, debounced persistence
//!
//! The canvas holds a transient shadow of the caller's overlay
//! collection. Pointer moves update the shadow immediately for visual
//! feedback and persist the position through the store after a quiet
//! period, so a burst of rapid moves collapses into one update call.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::utils::config::OverlayConfig;
use crate::utils::error::Result;
use crate::utils::timer::Debouncer;

use super::coords::{self, Axis, SurfaceSize};
use super::drag::DragController;
use super::store::OverlayStore;
use super::{Overlay, OverlayPatch};

pub struct OverlayCanvas {
    store: Arc<dyn OverlayStore>,
    overlays: Vec<Overlay>,
    drag: DragController,
    persist_debounce: Debouncer,
    surface: SurfaceSize,
    config: OverlayConfig,
}

impl OverlayCanvas {
    pub fn new(store: Arc<dyn OverlayStore>, surface: SurfaceSize, config: OverlayConfig) -> Self {
        let persist_debounce = Debouncer::new(Duration::from_millis(config.persist_debounce_ms));
        Self {
            store,
            overlays: Vec::new(),
            drag: DragController::new(),
            persist_debounce,
            surface,
            config,
        }
    }

    /// Current shadow copy of the overlay collection.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    /// The render surface was resized. Stored geometry is unaffected,
    /// only its projection changes.
    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    /// Reconcile an external snapshot of the caller's collection into
    /// the shadow copy. An in-progress drag wins over the external
    /// record for the same id; everything else takes the external
    /// version.
    pub fn sync_overlays(&mut self, external: Vec<Overlay>) {
        let dragged = self.drag.dragged_id().map(str::to_string);
        let local_dragged = dragged.as_deref().and_then(|id| {
            self.overlays
                .iter()
                .find(|o| o.id.as_deref() == Some(id))
                .cloned()
        });

        self.overlays = external;
        if let (Some(id), Some(local)) = (dragged.as_deref(), local_dragged) {
            if let Some(slot) = self.overlays.iter_mut().find(|o| o.id.as_deref() == Some(id)) {
                *slot = local;
            }
        }
    }

    /// Create an overlay through the store and add it to the shadow.
    pub async fn create_overlay(&mut self, draft: Overlay) -> Result<Overlay> {
        let created = self.store.create(draft).await?;
        self.overlays.push(created.clone());
        Ok(created)
    }

    /// Delete an overlay through the store and drop it from the shadow.
    pub async fn delete_overlay(&mut self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        self.overlays.retain(|o| o.id.as_deref() != Some(id));
        Ok(())
    }

    /// Pointer pressed at `(pointer_x, pointer_y)` screen pixels on the
    /// overlay with the given id. Returns whether a drag started.
    pub fn pointer_down(&mut self, overlay_id: &str, pointer_x: f32, pointer_y: f32) -> bool {
        let Some(overlay) = self
            .overlays
            .iter()
            .find(|o| o.id.as_deref() == Some(overlay_id))
        else {
            return false;
        };

        let rect = coords::project(overlay, self.surface);
        self.drag.begin(
            overlay.id.as_deref(),
            pointer_x - rect.x,
            pointer_y - rect.y,
        )
    }

    /// Pointer moved to `(pointer_x, pointer_y)` screen pixels.
    ///
    /// While a drag is active this clamps the new on-screen position to
    /// keep the overlay's minimum footprint on the surface, updates the
    /// shadow immediately, and schedules a debounced position update
    /// through the store.
    pub fn pointer_move(&mut self, pointer_x: f32, pointer_y: f32) {
        let Some(session) = self.drag.session() else {
            return;
        };
        let id = session.overlay_id.clone();

        // The upper bound can go negative on surfaces smaller than the
        // minimum footprint; pin to the origin in that case.
        let max_x = (self.surface.width - self.config.min_footprint_width).max(0.0);
        let max_y = (self.surface.height - self.config.min_footprint_height).max(0.0);
        let screen_x = (pointer_x - session.offset_x).clamp(0.0, max_x);
        let screen_y = (pointer_y - session.offset_y).clamp(0.0, max_y);

        let ref_x = coords::to_reference(screen_x, Axis::X, self.surface);
        let ref_y = coords::to_reference(screen_y, Axis::Y, self.surface);

        if let Some(overlay) = self.overlays.iter_mut().find(|o| o.id.as_deref() == Some(&*id)) {
            overlay.x = ref_x;
            overlay.y = ref_y;
        }

        let store = Arc::clone(&self.store);
        self.persist_debounce.call(async move {
            if let Err(e) = store.update(&id, OverlayPatch::position(ref_x, ref_y)).await {
                warn!("Failed to persist overlay position: {}", e);
            }
        });
    }

    /// Pointer released. The last debounced persistence call stands.
    pub fn pointer_up(&mut self) {
        self.drag.end();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Cancel any pending persistence call. Called on teardown.
    pub fn teardown(&mut self) {
        self.persist_debounce.cancel();
        self.drag.end();
    }
}
