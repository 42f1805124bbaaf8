//! Overlay persistence collaborator
//!
//! The core never owns the overlay collection; it requests changes
//! through this trait and reconciles the caller's list back into its
//! shadow copy. Calls are async and their failures are reported, not
//! swallowed.

use async_trait::async_trait;

use crate::utils::error::{LiveframeError, Result};

use super::{Overlay, OverlayPatch};

/// Caller-supplied overlay CRUD surface.
#[async_trait]
pub trait OverlayStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Overlay>>;

    /// Persist a new overlay. The returned overlay carries the
    /// assigned id.
    async fn create(&self, draft: Overlay) -> Result<Overlay>;

    async fn update(&self, id: &str, patch: OverlayPatch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory store used by tests and the headless harness.
#[derive(Debug, Default)]
pub struct MemoryOverlayStore {
    inner: std::sync::Mutex<MemoryStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    overlays: Vec<Overlay>,
    next_id: u64,
    update_log: Vec<(String, OverlayPatch)>,
}

impl MemoryOverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update call received, in order. Used by tests to assert
    /// debounce behavior.
    pub fn update_log(&self) -> Vec<(String, OverlayPatch)> {
        self.inner.lock().unwrap().update_log.clone()
    }
}

#[async_trait]
impl OverlayStore for MemoryOverlayStore {
    async fn list(&self) -> Result<Vec<Overlay>> {
        Ok(self.inner.lock().unwrap().overlays.clone())
    }

    async fn create(&self, mut draft: Overlay) -> Result<Overlay> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        draft.id = Some(format!("overlay-{}", inner.next_id));
        inner.overlays.push(draft.clone());
        Ok(draft)
    }

    async fn update(&self, id: &str, patch: OverlayPatch) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.update_log.push((id.to_string(), patch.clone()));

        let overlay = inner
            .overlays
            .iter_mut()
            .find(|o| o.id.as_deref() == Some(id))
            .ok_or_else(|| LiveframeError::Overlay(format!("Unknown overlay id: {}", id)))?;
        patch.apply_to(overlay);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.overlays.len();
        inner.overlays.retain(|o| o.id.as_deref() != Some(id));
        if inner.overlays.len() == before {
            return Err(LiveframeError::Overlay(format!("Unknown overlay id: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = MemoryOverlayStore::new();
        let created = store.create(Overlay::text("hello")).await.unwrap();
        assert!(created.id.is_some());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_applies_patch_and_logs() {
        let store = MemoryOverlayStore::new();
        let created = store.create(Overlay::text("hello")).await.unwrap();
        let id = created.id.unwrap();

        store
            .update(&id, OverlayPatch::position(10.0, 20.0))
            .await
            .unwrap();

        let overlays = store.list().await.unwrap();
        assert_eq!(overlays[0].x, 10.0);
        assert_eq!(overlays[0].y, 20.0);
        assert_eq!(store.update_log().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let store = MemoryOverlayStore::new();
        let err = store.delete("missing").await.unwrap_err();
        assert!(matches!(err, LiveframeError::Overlay(_)));
    }
}
