//! Bounding region of a set of coordinates.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::net::types::LatLng;

/// Axis-aligned lat/lng rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Smallest rectangle containing every point; `None` for no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { south_west: first, north_east: first }, |b, p| b.extend(*p)))
    }

    #[must_use]
    pub fn extend(self, p: LatLng) -> Self {
        Self {
            south_west: LatLng::new(self.south_west.lat.min(p.lat), self.south_west.lng.min(p.lng)),
            north_east: LatLng::new(self.north_east.lat.max(p.lat), self.north_east.lng.max(p.lng)),
        }
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}
