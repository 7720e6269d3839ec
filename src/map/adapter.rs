//! Keeps map visuals congruent with the bundle store.
//!
//! SYSTEM CONTEXT
//! ==============
//! One adapter per map surface. Committed entities are drawn as red polylines
//! (paths) and markers (places), tracked in two id-keyed caches. While an admin
//! draws a draft, committed visuals are hidden and a single transient
//! primitive (not cached) collects the clicks.
//!
//! DESIGN
//! ======
//! Click handlers are data, not closures: the detail needed to fill an info
//! panel is captured in the cache entry when the visual is drawn, and
//! `handle_event` dispatches on the handle the surface reports.

#[cfg(test)]
#[path = "adapter_test.rs"]
mod adapter_test;

use crate::net::types::{Bundle, LatLng, Path, PathId, Place, PlaceId};
use crate::state::bundles::{EntityRef, walk};

use super::bounds::Bounds;
use super::cache::HandleCache;
use super::surface::{
    InfoAnchor, InfoPanel, MapEvent, MapSurface, MarkerHandle, MarkerSpec, PolylineHandle, PolylineSpec, Stroke,
};

pub const DRAG_HINT: &str = "Drag me to change position";

/// Title and body captured for a visual's info panel.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl InfoContent {
    fn for_place(place: &Place) -> Self {
        Self {
            title: place.name.clone(),
            lines: vec![
                place.info.clone(),
                format!("Latitude: {}", place.position.lat),
                format!("Longitude: {}", place.position.lng),
            ],
        }
    }

    fn for_path(path: &Path) -> Self {
        Self {
            title: path.name.clone(),
            lines: vec![
                path.info.clone(),
                format!("Duration: {} Hours", path.duration),
                format!("Length: {} km", path.length),
            ],
        }
    }

    fn at(self, anchor: InfoAnchor) -> InfoPanel {
        InfoPanel { title: self.title, lines: self.lines, anchor }
    }
}

/// Click detail for a committed path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDetail {
    pub content: InfoContent,
    pub points: Vec<LatLng>,
}

/// Edit to apply to the draft entity after a surface event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DraftChange {
    /// Append to the draft path's polyline.
    PathPoint(LatLng),
    /// Set the draft place's position.
    PlacePosition(LatLng),
}

/// The single transient primitive used while drawing.
#[derive(Debug)]
enum DraftVisual {
    Path { polyline: Option<PolylineHandle> },
    /// Clicks are captured until the marker exists.
    Place { marker: Option<MarkerHandle> },
}

pub struct MapSurfaceAdapter<S> {
    surface: S,
    markers: HandleCache<PlaceId, MarkerHandle, InfoContent>,
    polylines: HandleCache<PathId, PolylineHandle, PathDetail>,
    shown: bool,
    draft: Option<DraftVisual>,
}

impl<S: MapSurface> MapSurfaceAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            markers: HandleCache::new(),
            polylines: HandleCache::new(),
            shown: true,
            draft: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    #[must_use]
    pub fn has_marker(&self, id: PlaceId) -> bool {
        self.markers.contains(id)
    }

    #[must_use]
    pub fn has_polyline(&self, id: PathId) -> bool {
        self.polylines.contains(id)
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    pub fn marker_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.markers.keys()
    }

    pub fn polyline_ids(&self) -> impl Iterator<Item = PathId> + '_ {
        self.polylines.keys()
    }

    #[must_use]
    pub fn marker_handle(&self, id: PlaceId) -> Option<MarkerHandle> {
        self.markers.get(id).map(|t| t.handle)
    }

    #[must_use]
    pub fn polyline_handle(&self, id: PathId) -> Option<PolylineHandle> {
        self.polylines.get(id).map(|t| t.handle)
    }

    // -------------------------------------------------------------------------
    // Committed visuals
    // -------------------------------------------------------------------------

    /// Draw every path and place in `bundles`. Safe to call repeatedly.
    pub fn render_all<'a, I>(&mut self, bundles: I)
    where
        I: IntoIterator<Item = &'a Bundle>,
    {
        for entity in walk(bundles) {
            match entity {
                EntityRef::Path(path) => self.upsert_path_polyline(path),
                EntityRef::Place(place) => self.upsert_place_marker(place),
            }
        }
        tracing::debug!(markers = self.markers.len(), polylines = self.polylines.len(), "rendered bundles");
    }

    /// Replace (or create) the marker for `place`. Places without an id are
    /// drafts and are not drawn here.
    pub fn upsert_place_marker(&mut self, place: &Place) {
        let Some(id) = place.id else {
            return;
        };
        self.remove_marker(id);
        let handle = self.surface.add_marker(MarkerSpec {
            position: place.position,
            title: place.name.clone(),
            draggable: false,
        });
        if !self.shown {
            self.surface.set_marker_visible(handle, false);
        }
        self.markers.insert(id, handle, InfoContent::for_place(place));
    }

    /// Replace (or create) the polyline for `path`.
    pub fn upsert_path_polyline(&mut self, path: &Path) {
        let Some(id) = path.id else {
            return;
        };
        self.remove_polyline(id);
        let handle = self.surface.add_polyline(PolylineSpec {
            points: path.polyline.clone(),
            title: path.name.clone(),
            stroke: Stroke::COMMITTED,
        });
        if !self.shown {
            self.surface.set_polyline_visible(handle, false);
        }
        self.polylines.insert(
            id,
            handle,
            PathDetail { content: InfoContent::for_path(path), points: path.polyline.clone() },
        );
    }

    pub fn remove_marker(&mut self, id: PlaceId) {
        if let Some(old) = self.markers.remove(id) {
            self.surface.remove_marker(old.handle);
        }
    }

    pub fn remove_polyline(&mut self, id: PathId) {
        if let Some(old) = self.polylines.remove(id) {
            self.surface.remove_polyline(old.handle);
        }
    }

    /// Remove a path's polyline and the markers of every place on it.
    pub fn remove_path_visuals(&mut self, path: &Path) {
        if let Some(id) = path.id {
            self.remove_polyline(id);
        }
        for place in &path.places {
            if let Some(id) = place.id {
                self.remove_marker(id);
            }
        }
    }

    /// Remove visuals for everything nested in `bundle`.
    pub fn remove_bundle_visuals(&mut self, bundle: &Bundle) {
        for path in &bundle.paths {
            self.remove_path_visuals(path);
        }
    }

    pub fn hide_all(&mut self) {
        self.set_all_visible(false);
    }

    pub fn show_all(&mut self) {
        self.set_all_visible(true);
    }

    fn set_all_visible(&mut self, visible: bool) {
        self.shown = visible;
        let markers: Vec<MarkerHandle> = self.markers.handles().collect();
        for handle in markers {
            self.surface.set_marker_visible(handle, visible);
        }
        let polylines: Vec<PolylineHandle> = self.polylines.handles().collect();
        for handle in polylines {
            self.surface.set_polyline_visible(handle, visible);
        }
    }

    /// Open the place's info panel, as if its marker had been clicked.
    pub fn show_place_on_map(&mut self, id: PlaceId) -> bool {
        let Some(tracked) = self.markers.get(id) else {
            return false;
        };
        let panel = tracked.detail.clone().at(InfoAnchor::Marker(tracked.handle));
        self.surface.open_info(panel);
        true
    }

    /// Fit the viewport to the path and open its info panel at the first
    /// coordinate, as if its polyline had been clicked.
    pub fn show_path_on_map(&mut self, id: PathId) -> bool {
        let Some(tracked) = self.polylines.get(id) else {
            return false;
        };
        let detail = tracked.detail.clone();
        if let Some(bounds) = Bounds::from_points(&detail.points) {
            self.surface.fit_bounds(bounds);
        }
        let anchor = detail
            .points
            .first()
            .map_or(InfoAnchor::Viewport, |p| InfoAnchor::Position(*p));
        self.surface.open_info(detail.content.at(anchor));
        true
    }

    // -------------------------------------------------------------------------
    // Draft drawing
    // -------------------------------------------------------------------------

    /// Start capturing clicks for a path. An existing polyline (edit mode)
    /// is drawn immediately and the viewport fitted to it.
    pub fn begin_path_draft(&mut self, existing: &[LatLng]) {
        self.end_draft_visual();
        self.hide_all();
        let polyline = (!existing.is_empty()).then(|| {
            if let Some(bounds) = Bounds::from_points(existing) {
                self.surface.fit_bounds(bounds);
            }
            self.surface.add_polyline(PolylineSpec {
                points: existing.to_vec(),
                title: String::new(),
                stroke: Stroke::DRAFT,
            })
        });
        self.draft = Some(DraftVisual::Path { polyline });
    }

    /// Start a place draft. With an existing position (edit mode) the marker
    /// is placed immediately; otherwise the next map click places it.
    pub fn begin_place_draft(&mut self, existing: Option<LatLng>) {
        self.end_draft_visual();
        self.hide_all();
        let marker = existing.map(|position| self.place_draft_marker(position));
        self.draft = Some(DraftVisual::Place { marker });
    }

    /// Tear down the transient primitive and its click capture, then restore
    /// committed visuals.
    pub fn end_draft(&mut self) {
        self.end_draft_visual();
        self.show_all();
    }

    #[must_use]
    pub fn is_drafting(&self) -> bool {
        self.draft.is_some()
    }

    fn end_draft_visual(&mut self) {
        match self.draft.take() {
            Some(DraftVisual::Path { polyline: Some(handle) }) => self.surface.remove_polyline(handle),
            Some(DraftVisual::Place { marker: Some(handle) }) => self.surface.remove_marker(handle),
            _ => {}
        }
    }

    fn place_draft_marker(&mut self, position: LatLng) -> MarkerHandle {
        let handle = self.surface.add_marker(MarkerSpec { position, title: String::new(), draggable: true });
        self.surface.open_info(InfoPanel {
            title: DRAG_HINT.to_owned(),
            lines: Vec::new(),
            anchor: InfoAnchor::Marker(handle),
        });
        handle
    }

    /// Dispatch a surface event. Returns the edit the caller must apply to its
    /// draft entity, if the event fed the draft.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<DraftChange> {
        match event {
            MapEvent::Click(point) => self.capture_click(point),
            MapEvent::MarkerClick(handle) => {
                if let Some(id) = self.markers.key_for(handle) {
                    self.show_place_on_map(id);
                }
                None
            }
            MapEvent::PolylineClick(handle) => {
                if let Some(id) = self.polylines.key_for(handle) {
                    self.show_path_on_map(id);
                }
                None
            }
            MapEvent::MarkerDragEnd(handle, point) => match &self.draft {
                Some(DraftVisual::Place { marker: Some(draft) }) if *draft == handle => {
                    Some(DraftChange::PlacePosition(point))
                }
                _ => None,
            },
        }
    }

    fn capture_click(&mut self, point: LatLng) -> Option<DraftChange> {
        match self.draft.take() {
            Some(DraftVisual::Path { polyline }) => {
                let handle = polyline.unwrap_or_else(|| {
                    self.surface.add_polyline(PolylineSpec {
                        points: Vec::new(),
                        title: String::new(),
                        stroke: Stroke::DRAFT,
                    })
                });
                self.surface.extend_polyline(handle, point);
                self.draft = Some(DraftVisual::Path { polyline: Some(handle) });
                Some(DraftChange::PathPoint(point))
            }
            Some(DraftVisual::Place { marker: None }) => {
                // Only one marker per place: stop capturing after the first click.
                let handle = self.place_draft_marker(point);
                self.draft = Some(DraftVisual::Place { marker: Some(handle) });
                Some(DraftChange::PlacePosition(point))
            }
            other => {
                self.draft = other;
                None
            }
        }
    }
}
