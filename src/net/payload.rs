//! Request bodies sent to the REST server.
//!
//! Each payload borrows from a draft and names exactly the fields the server
//! accepts for that operation; anything else on the draft is never serialized.

#[cfg(test)]
#[path = "payload_test.rs"]
mod payload_test;

use serde::Serialize;

use super::types::{
    Bundle, BundleId, LatLng, Media, Path, PathId, Place, PlaceId, serialize_f64_text, serialize_f64_whole,
};

/// Body for `POST /api/v1/bundles` and `PUT /api/v1/bundles/{id}`.
#[derive(Debug, Serialize)]
pub struct BundlePayload<'a> {
    pub name: &'a str,
    pub info: &'a str,
    pub image: &'a str,
}

impl<'a> From<&'a Bundle> for BundlePayload<'a> {
    fn from(bundle: &'a Bundle) -> Self {
        Self { name: &bundle.name, info: &bundle.info, image: &bundle.image }
    }
}

/// Body for path create/update. `id` is only present on update. `length`
/// and `duration` travel as text, matching the server's columns.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PathId>,
    pub name: &'a str,
    pub info: &'a str,
    pub image: &'a str,
    #[serde(serialize_with = "serialize_f64_text")]
    pub length: f64,
    pub polyline: &'a [LatLng],
    pub places: &'a [Place],
    #[serde(serialize_with = "serialize_f64_text")]
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<BundleId>,
}

impl<'a> PathPayload<'a> {
    #[must_use]
    pub fn for_create(path: &'a Path) -> Self {
        Self { id: None, ..Self::for_update(path) }
    }

    #[must_use]
    pub fn for_update(path: &'a Path) -> Self {
        Self {
            id: path.id,
            name: &path.name,
            info: &path.info,
            image: &path.image,
            length: path.length,
            polyline: &path.polyline,
            places: &path.places,
            duration: path.duration,
            bundle_id: path.bundle_id,
        }
    }
}

/// Body for place create/update. `id` is only present on update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PlaceId>,
    pub name: &'a str,
    pub info: &'a str,
    #[serde(serialize_with = "serialize_f64_whole")]
    pub radius: f64,
    pub position: LatLng,
    pub media: &'a [Media],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_id: Option<PathId>,
}

impl<'a> PlacePayload<'a> {
    #[must_use]
    pub fn for_create(place: &'a Place) -> Self {
        Self { id: None, ..Self::for_update(place) }
    }

    #[must_use]
    pub fn for_update(place: &'a Place) -> Self {
        Self {
            id: place.id,
            name: &place.name,
            info: &place.info,
            radius: place.radius,
            position: place.position,
            media: &place.media,
            path_id: place.path_id,
        }
    }
}

/// Credentials for `POST /api/v1/login`, sent form-encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Reset both fields after a login attempt.
    pub fn clear(&mut self) {
        self.username.clear();
        self.password.clear();
    }
}
