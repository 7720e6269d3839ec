//! Admin map controller: CRUD for bundles, paths and places.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything the public view does, plus a draft slot fed by map events and
//! form edits. A save sends the draft, then reconciles the store and the
//! visuals with the server's answer.
//!
//! DESIGN
//! ======
//! - Every operation ends in `ViewMode::ListBundles`, success or failure.
//! - All failures funnel through `handle_error`. A 401 also drops the session
//!   and routes back to the public map.
//! - Path/place responses are applied by `path_saved` / `place_saved`. They
//!   look the parent (or target) up again, and an answer for something that
//!   was deleted meanwhile is dropped without a notice.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::map::adapter::{DraftChange, MapSurfaceAdapter};
use crate::map::surface::{MapEvent, MapSurface};
use crate::net::api::Api;
use crate::net::payload::{PathPayload, PlacePayload};
use crate::net::types::{Bundle, BundleId, Path, PathId, Place, PlaceId};
use crate::state::bundles::BundleStore;
use crate::state::notice::{NoticeLevel, Notifier};
use crate::state::session::SessionGate;

use super::mode::{Draft, Route, ViewMode};

pub struct AdminView<S> {
    store: BundleStore,
    api: Arc<dyn Api>,
    session: Arc<SessionGate>,
    notifier: Arc<dyn Notifier>,
    map: MapSurfaceAdapter<S>,
    mode: ViewMode,
    draft: Draft,
    route: Route,
}

impl<S: MapSurface> AdminView<S> {
    pub fn new<A: Api + 'static>(
        api: Arc<A>,
        session: Arc<SessionGate>,
        notifier: Arc<dyn Notifier>,
        surface: S,
    ) -> Self {
        Self {
            store: BundleStore::new(api.clone()),
            api,
            session,
            notifier,
            map: MapSurfaceAdapter::new(surface),
            mode: ViewMode::ListBundles,
            draft: Draft::None,
            route: Route::Admin,
        }
    }

    /// Fetch the bundle tree and draw it.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        if let Err(e) = self.store.load().await {
            return Err(self.handle_error("Failed to load bundles", e).await);
        }
        self.map.render_all(self.store.bundles().values());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn bundles(&self) -> &BTreeMap<BundleId, Bundle> {
        self.store.bundles()
    }

    #[must_use]
    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub fn map(&self) -> &MapSurfaceAdapter<S> {
        &self.map
    }

    /// Form access to the bundle draft.
    pub fn bundle_draft_mut(&mut self) -> Option<&mut Bundle> {
        match &mut self.draft {
            Draft::Bundle(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn path_draft_mut(&mut self) -> Option<&mut Path> {
        match &mut self.draft {
            Draft::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn place_draft_mut(&mut self) -> Option<&mut Place> {
        match &mut self.draft {
            Draft::Place(place) => Some(place),
            _ => None,
        }
    }

    pub fn show_path_on_map(&mut self, id: PathId) -> bool {
        self.map.show_path_on_map(id)
    }

    pub fn show_place_on_map(&mut self, id: PlaceId) -> bool {
        self.map.show_place_on_map(id)
    }

    /// Route a surface event, feeding the draft when it was captured.
    pub fn handle_map_event(&mut self, event: MapEvent) {
        let Some(change) = self.map.handle_event(event) else {
            return;
        };
        match (change, &mut self.draft) {
            (DraftChange::PathPoint(point), Draft::Path(path)) => path.polyline.push(point),
            (DraftChange::PlacePosition(point), Draft::Place(place)) => place.position = point,
            (change, _) => tracing::debug!(?change, "draft change without matching draft"),
        }
    }

    // -------------------------------------------------------------------------
    // Bundles
    // -------------------------------------------------------------------------

    pub fn new_bundle(&mut self) {
        self.discard_draft();
        self.draft = Draft::Bundle(Bundle::draft());
        self.mode = ViewMode::AddBundle;
    }

    pub fn edit_bundle(&mut self, id: BundleId) -> bool {
        let Some(bundle) = self.store.get(id) else {
            return false;
        };
        let draft = bundle.edit_draft();
        self.discard_draft();
        self.draft = Draft::Bundle(draft);
        self.mode = ViewMode::EditBundle;
        true
    }

    pub fn cancel_edit_bundle(&mut self) {
        self.discard_draft();
        self.mode = ViewMode::ListBundles;
    }

    /// Create or update the bundle draft.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn save_bundle(&mut self) -> Result<(), ApiError> {
        let Draft::Bundle(draft) = std::mem::take(&mut self.draft) else {
            tracing::debug!("save_bundle without bundle draft");
            return Ok(());
        };
        self.mode = ViewMode::ListBundles;
        match draft.id {
            None => match self.store.create_bundle(&draft).await {
                Ok(_) => self.notifier.notify("Created bundle.", NoticeLevel::Info),
                Err(e) => return Err(self.handle_error("Failed to create bundle", e).await),
            },
            Some(id) => match self.store.update_bundle(id, &draft).await {
                Ok(_) => self.notifier.notify("Updated bundle.", NoticeLevel::Info),
                Err(e) => return Err(self.handle_error("Failed to update bundle", e).await),
            },
        }
        Ok(())
    }

    /// Delete a bundle and every visual nested in it.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn delete_bundle(&mut self, id: BundleId) -> Result<(), ApiError> {
        match self.store.delete_bundle(id).await {
            Ok(removed) => {
                if let Some(bundle) = removed {
                    self.map.remove_bundle_visuals(&bundle);
                }
                self.notifier.notify("Deleted bundle.", NoticeLevel::Info);
                self.discard_draft();
                self.mode = ViewMode::ListBundles;
                Ok(())
            }
            Err(e) => Err(self.handle_error("Failed to delete bundle", e).await),
        }
    }

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    /// Start drawing a new path under `bundle_id`.
    pub fn new_path(&mut self, bundle_id: BundleId) -> bool {
        if !self.store.contains(bundle_id) {
            return false;
        }
        self.discard_draft();
        self.map.begin_path_draft(&[]);
        self.draft = Draft::Path(Path::draft(bundle_id));
        self.mode = ViewMode::AddPath;
        true
    }

    /// Start editing a copy of an existing path; further clicks extend it.
    pub fn edit_path(&mut self, id: PathId) -> bool {
        let Some(path) = self.store.path(id) else {
            return false;
        };
        let draft = path.clone();
        self.discard_draft();
        self.map.begin_path_draft(&draft.polyline);
        self.draft = Draft::Path(draft);
        self.mode = ViewMode::EditPath;
        true
    }

    pub fn cancel_edit_path(&mut self) {
        self.discard_draft();
        self.mode = ViewMode::ListBundles;
    }

    /// Create or update the path draft.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn save_path(&mut self) -> Result<(), ApiError> {
        let Draft::Path(draft) = std::mem::take(&mut self.draft) else {
            tracing::debug!("save_path without path draft");
            return Ok(());
        };
        self.map.end_draft();
        let (prefix, result) = match draft.id {
            None => ("Failed to create path", self.api.create_path(&PathPayload::for_create(&draft)).await),
            Some(id) => ("Failed to update path", self.api.update_path(id, &PathPayload::for_update(&draft)).await),
        };
        match result {
            Ok(saved) => {
                self.path_saved(saved, draft.id.is_none());
                Ok(())
            }
            Err(e) => Err(self.handle_error(prefix, e).await),
        }
    }

    /// Apply a path create (`created`) or update response.
    pub fn path_saved(&mut self, saved: Path, created: bool) {
        self.mode = ViewMode::ListBundles;
        if created {
            let Some(path) = self.store.insert_path(saved) else {
                tracing::info!("parent bundle gone; dropping created path");
                return;
            };
            self.map.upsert_path_polyline(path);
            self.notifier.notify("Created path.", NoticeLevel::Info);
        } else {
            let Some(path) = saved.id.and_then(|id| self.store.path_mut(id)) else {
                tracing::info!(id = ?saved.id, "path gone; dropping update");
                return;
            };
            path.apply_update(&saved);
            self.map.upsert_path_polyline(path);
            self.notifier.notify("Updated path.", NoticeLevel::Info);
        }
    }

    /// Delete a path, its polyline and the markers of its places.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn delete_path(&mut self, id: PathId) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_path(id).await {
            return Err(self.handle_error("Failed to delete path", e).await);
        }
        for path in self.store.remove_path(id) {
            self.map.remove_path_visuals(&path);
        }
        self.map.remove_polyline(id);
        self.notifier.notify("Deleted path.", NoticeLevel::Info);
        self.discard_draft();
        self.mode = ViewMode::ListBundles;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Places
    // -------------------------------------------------------------------------

    /// Start a new place on `path_id`; the next map click positions it.
    pub fn new_place(&mut self, path_id: PathId) -> bool {
        if self.store.path(path_id).is_none() {
            return false;
        }
        self.discard_draft();
        self.map.begin_place_draft(None);
        self.draft = Draft::Place(Place::draft(path_id));
        self.mode = ViewMode::AddPlace;
        true
    }

    /// Start editing a copy of an existing place; its marker can be dragged.
    pub fn edit_place(&mut self, id: PlaceId) -> bool {
        let Some(place) = self.store.place(id) else {
            return false;
        };
        let draft = place.clone();
        self.discard_draft();
        self.map.begin_place_draft(Some(draft.position));
        self.draft = Draft::Place(draft);
        self.mode = ViewMode::EditPlace;
        true
    }

    pub fn cancel_edit_place(&mut self) {
        self.discard_draft();
        self.mode = ViewMode::ListBundles;
    }

    /// Create or update the place draft.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn save_place(&mut self) -> Result<(), ApiError> {
        let Draft::Place(draft) = std::mem::take(&mut self.draft) else {
            tracing::debug!("save_place without place draft");
            return Ok(());
        };
        self.map.end_draft();
        let (prefix, result) = match draft.id {
            None => ("Failed to create place", self.api.create_place(&PlacePayload::for_create(&draft)).await),
            Some(id) => ("Failed to update place", self.api.update_place(id, &PlacePayload::for_update(&draft)).await),
        };
        match result {
            Ok(saved) => {
                self.place_saved(saved, draft.id.is_none());
                Ok(())
            }
            Err(e) => Err(self.handle_error(prefix, e).await),
        }
    }

    /// Apply a place create (`created`) or update response.
    pub fn place_saved(&mut self, saved: Place, created: bool) {
        self.mode = ViewMode::ListBundles;
        if created {
            let Some(place) = self.store.insert_place(saved) else {
                tracing::info!("parent path gone; dropping created place");
                return;
            };
            self.map.upsert_place_marker(place);
            self.notifier.notify("Created place.", NoticeLevel::Info);
        } else {
            let Some(place) = saved.id.and_then(|id| self.store.place_mut(id)) else {
                tracing::info!(id = ?saved.id, "place gone; dropping update");
                return;
            };
            place.apply_update(&saved);
            self.map.upsert_place_marker(place);
            self.notifier.notify("Updated place.", NoticeLevel::Info);
        }
    }

    /// Delete a place and its marker.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been handled.
    pub async fn delete_place(&mut self, id: PlaceId) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_place(id).await {
            return Err(self.handle_error("Failed to delete place", e).await);
        }
        self.store.remove_place(id);
        self.map.remove_marker(id);
        self.notifier.notify("Deleted place.", NoticeLevel::Info);
        self.discard_draft();
        self.mode = ViewMode::ListBundles;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Shared
    // -------------------------------------------------------------------------

    /// Drop the draft and its transient visual without touching the store.
    fn discard_draft(&mut self) {
        if self.map.is_drafting() {
            self.map.end_draft();
        }
        self.draft = Draft::None;
    }

    /// Surface a failure and reset the view. On 401 the session is dropped,
    /// the server is told to log out, and the route falls back to the public
    /// map. Hands the error back for the caller to propagate.
    async fn handle_error(&mut self, prefix: &str, err: ApiError) -> ApiError {
        self.notifier
            .notify(&format!("{prefix}: {}", err.notice_detail()), NoticeLevel::Alarm);
        self.discard_draft();
        self.mode = ViewMode::ListBundles;

        if err.is_unauthorized() {
            tracing::info!("session expired; returning to public map");
            self.session.clear();
            if let Err(e) = self.api.logout().await {
                tracing::debug!(error = %e, "logout after 401 failed");
            }
            self.route = Route::Public;
        }
        err
    }
}
