//! Headless `MapSurface` that keeps live primitives in memory.
//!
//! Used by the CLI to render without a browser and by tests to observe what
//! the adapter drew. Every operation is traced at `trace` level.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::BTreeMap;

use crate::net::types::LatLng;

use super::bounds::Bounds;
use super::surface::{InfoPanel, MapOptions, MapSurface, MarkerHandle, MarkerSpec, PolylineHandle, PolylineSpec};

#[derive(Clone, Debug, PartialEq)]
pub struct LiveMarker {
    pub spec: MarkerSpec,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LivePolyline {
    pub spec: PolylineSpec,
    pub visible: bool,
}

/// Camera state after the last `fit_bounds`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub fitted: Option<Bounds>,
}

#[derive(Debug)]
pub struct MemorySurface {
    markers: BTreeMap<u64, LiveMarker>,
    polylines: BTreeMap<u64, LivePolyline>,
    info: Option<InfoPanel>,
    viewport: Viewport,
    next_handle: u64,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new(MapOptions::default())
    }
}

impl MemorySurface {
    #[must_use]
    pub fn new(options: MapOptions) -> Self {
        Self {
            markers: BTreeMap::new(),
            polylines: BTreeMap::new(),
            info: None,
            viewport: Viewport { center: options.center, zoom: options.zoom, fitted: None },
            next_handle: 1,
        }
    }

    #[must_use]
    pub fn marker(&self, handle: MarkerHandle) -> Option<&LiveMarker> {
        self.markers.get(&handle.0)
    }

    #[must_use]
    pub fn polyline(&self, handle: PolylineHandle) -> Option<&LivePolyline> {
        self.polylines.get(&handle.0)
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    #[must_use]
    pub fn visible_marker_count(&self) -> usize {
        self.markers.values().filter(|m| m.visible).count()
    }

    #[must_use]
    pub fn visible_polyline_count(&self) -> usize {
        self.polylines.values().filter(|p| p.visible).count()
    }

    #[must_use]
    pub fn info(&self) -> Option<&InfoPanel> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn issue(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl MapSurface for MemorySurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle {
        let handle = self.issue();
        tracing::trace!(handle, title = %spec.title, lat = spec.position.lat, lng = spec.position.lng, "add marker");
        self.markers.insert(handle, LiveMarker { spec, visible: true });
        MarkerHandle(handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        tracing::trace!(handle = handle.0, "remove marker");
        self.markers.remove(&handle.0);
    }

    fn set_marker_visible(&mut self, handle: MarkerHandle, visible: bool) {
        if let Some(marker) = self.markers.get_mut(&handle.0) {
            marker.visible = visible;
        }
    }

    fn add_polyline(&mut self, spec: PolylineSpec) -> PolylineHandle {
        let handle = self.issue();
        tracing::trace!(handle, title = %spec.title, points = spec.points.len(), "add polyline");
        self.polylines.insert(handle, LivePolyline { spec, visible: true });
        PolylineHandle(handle)
    }

    fn remove_polyline(&mut self, handle: PolylineHandle) {
        tracing::trace!(handle = handle.0, "remove polyline");
        self.polylines.remove(&handle.0);
    }

    fn set_polyline_visible(&mut self, handle: PolylineHandle, visible: bool) {
        if let Some(polyline) = self.polylines.get_mut(&handle.0) {
            polyline.visible = visible;
        }
    }

    fn extend_polyline(&mut self, handle: PolylineHandle, point: LatLng) {
        if let Some(polyline) = self.polylines.get_mut(&handle.0) {
            polyline.spec.points.push(point);
        }
    }

    fn open_info(&mut self, panel: InfoPanel) {
        tracing::trace!(title = %panel.title, "open info");
        self.info = Some(panel);
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport.center = bounds.center();
        self.viewport.fitted = Some(bounds);
    }
}
