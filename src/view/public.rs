//! Public map controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Anonymous visitors only browse: load the tree once, draw it, and open info
//! panels on demand. No drafts, no session checks.

#[cfg(test)]
#[path = "public_test.rs"]
mod public_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::map::adapter::MapSurfaceAdapter;
use crate::map::surface::{MapEvent, MapSurface};
use crate::net::api::BundleApi;
use crate::net::types::{Bundle, BundleId, PathId, PlaceId};
use crate::state::bundles::BundleStore;
use crate::state::notice::{NoticeLevel, Notifier};

pub struct PublicView<S> {
    store: BundleStore,
    notifier: Arc<dyn Notifier>,
    map: MapSurfaceAdapter<S>,
}

impl<S: MapSurface> PublicView<S> {
    pub fn new(api: Arc<dyn BundleApi>, notifier: Arc<dyn Notifier>, surface: S) -> Self {
        Self { store: BundleStore::new(api), notifier, map: MapSurfaceAdapter::new(surface) }
    }

    /// Fetch the bundle tree and draw it.
    ///
    /// # Errors
    ///
    /// Returns the API error after surfacing it as a notice.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        match self.store.load().await {
            Ok(bundles) => {
                self.map.render_all(bundles.values());
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(&format!("Failed to load bundles: {}", e.notice_detail()), NoticeLevel::Alarm);
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn bundles(&self) -> &BTreeMap<BundleId, Bundle> {
        self.store.bundles()
    }

    pub fn map(&self) -> &MapSurfaceAdapter<S> {
        &self.map
    }

    pub fn show_path_on_map(&mut self, id: PathId) -> bool {
        self.map.show_path_on_map(id)
    }

    pub fn show_place_on_map(&mut self, id: PlaceId) -> bool {
        self.map.show_place_on_map(id)
    }

    /// Route a surface event; only visual clicks matter here.
    pub fn handle_map_event(&mut self, event: MapEvent) {
        self.map.handle_event(event);
    }
}
