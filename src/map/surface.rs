//! Port to the external map widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! The widget (a browser map, a test double, a headless recorder) owns the
//! live markers and polylines. This crate only ever holds opaque handles to
//! them and learns about user interaction through `MapEvent`s fed back in by
//! whoever drives the widget's event loop.

use crate::net::types::LatLng;

use super::bounds::Bounds;

/// Opaque handle to a live marker on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// Opaque handle to a live polyline on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PolylineHandle(pub u64);

/// Initial camera for a freshly created surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self { center: LatLng::new(63.0, 20.0), zoom: 8 }
    }
}

/// Line styling for polylines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub opacity: f64,
    pub weight: u32,
    pub geodesic: bool,
}

impl Stroke {
    /// Committed paths.
    pub const COMMITTED: Self = Self { color: "#FF0000", opacity: 1.0, weight: 2, geodesic: true };
    /// The path currently being drawn.
    pub const DRAFT: Self = Self { color: "#000000", opacity: 1.0, weight: 3, geodesic: false };
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    pub draggable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolylineSpec {
    pub points: Vec<LatLng>,
    pub title: String,
    pub stroke: Stroke,
}

/// Where an info panel is attached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InfoAnchor {
    Marker(MarkerHandle),
    Position(LatLng),
    /// No coordinate available; the surface picks a spot.
    Viewport,
}

/// Popup content shown when a visual is clicked.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoPanel {
    pub title: String,
    pub lines: Vec<String>,
    pub anchor: InfoAnchor,
}

/// User interaction reported by the widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapEvent {
    /// Click on empty map area.
    Click(LatLng),
    MarkerClick(MarkerHandle),
    PolylineClick(PolylineHandle),
    /// A draggable marker was dropped at a new position.
    MarkerDragEnd(MarkerHandle, LatLng),
}

/// Capability set of the external map widget.
pub trait MapSurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn set_marker_visible(&mut self, handle: MarkerHandle, visible: bool);

    fn add_polyline(&mut self, spec: PolylineSpec) -> PolylineHandle;
    fn remove_polyline(&mut self, handle: PolylineHandle);
    fn set_polyline_visible(&mut self, handle: PolylineHandle, visible: bool);
    /// Append one coordinate to a live polyline.
    fn extend_polyline(&mut self, handle: PolylineHandle, point: LatLng);

    /// Show the single info panel, replacing any open one.
    fn open_info(&mut self, panel: InfoPanel);
    /// Move and zoom the viewport so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: Bounds);
}
