//! Domain records mirrored from the REST server.
//!
//! DESIGN
//! ======
//! These types mirror the server's JSON payloads so a fetched bundle tree can
//! be held locally without a second translation layer. Ids are server-assigned
//! and absent on drafts, so every record carries `Option<Id>`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::num::FpCategory;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Server-assigned bundle identifier.
    BundleId
);
entity_id!(
    /// Server-assigned path identifier.
    PathId
);
entity_id!(
    /// Server-assigned place identifier.
    PlaceId
);
entity_id!(
    /// Server-assigned media identifier.
    MediaId
);

// =============================================================================
// GEOMETRY
// =============================================================================

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Additional media attached to a place (credits, photos, text snippets).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MediaId>,
    pub name: String,
    #[serde(default)]
    pub contents: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub image: String,
}

/// A named collection of paths shown together on the map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BundleId>,
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub paths: Vec<Path>,
}

/// A drawn route with metadata and the places along it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PathId>,
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub image: String,
    /// Length in kilometres.
    #[serde(default, serialize_with = "serialize_f64_text", deserialize_with = "deserialize_lenient_f64")]
    pub length: f64,
    /// Hiking time in hours.
    #[serde(default, serialize_with = "serialize_f64_text", deserialize_with = "deserialize_lenient_f64")]
    pub duration: f64,
    /// Coordinates in drawing order.
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub polyline: Vec<LatLng>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub places: Vec<Place>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<BundleId>,
}

/// A point of interest nested under a path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlaceId>,
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, serialize_with = "serialize_f64_whole", deserialize_with = "deserialize_lenient_f64")]
    pub radius: f64,
    #[serde(default)]
    pub position: LatLng,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_id: Option<PathId>,
}

impl Bundle {
    /// Empty draft for the "new bundle" form.
    #[must_use]
    pub fn draft() -> Self {
        Self::default()
    }

    /// Draft copy for the "edit bundle" form: scalar fields only, no paths.
    #[must_use]
    pub fn edit_draft(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            info: self.info.clone(),
            image: self.image.clone(),
            paths: Vec::new(),
        }
    }
}

impl Path {
    /// Empty draft for a new path under `bundle_id`.
    #[must_use]
    pub fn draft(bundle_id: BundleId) -> Self {
        Self { bundle_id: Some(bundle_id), ..Self::default() }
    }

    /// Copy server-owned scalar fields from an authoritative response,
    /// keeping identity and nested places.
    pub fn apply_update(&mut self, updated: &Path) {
        self.name.clone_from(&updated.name);
        self.info.clone_from(&updated.info);
        self.image.clone_from(&updated.image);
        self.length = updated.length;
        self.duration = updated.duration;
        self.polyline.clone_from(&updated.polyline);
    }
}

impl Place {
    /// Empty draft for a new place under `path_id`.
    #[must_use]
    pub fn draft(path_id: PathId) -> Self {
        Self { radius: 1.0, path_id: Some(path_id), ..Self::default() }
    }

    /// Copy server-owned fields from an authoritative response, keeping identity.
    pub fn apply_update(&mut self, updated: &Place) {
        self.name.clone_from(&updated.name);
        self.info.clone_from(&updated.info);
        self.radius = updated.radius;
        self.position = updated.position;
        self.media.clone_from(&updated.media);
    }
}

// =============================================================================
// WIRE ENCODING
// =============================================================================

/// 2^63, the first magnitude outside `i64`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// `length`/`duration` are text columns on the server. Zero goes out as the
/// empty string a fresh draft would send.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn serialize_f64_text<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.classify() == FpCategory::Zero {
        serializer.serialize_str("")
    } else {
        serializer.collect_str(value)
    }
}

/// `radius` is an integer column; round to the nearest whole number.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn serialize_f64_whole<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rounded = value.round();
    if !rounded.is_finite() || rounded.abs() >= I64_BOUND {
        return Err(S::Error::custom(format!("radius {value} is not a representable integer")));
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = rounded as i64;
    serializer.serialize_i64(whole)
}

// =============================================================================
// LENIENT DECODING
// =============================================================================

/// Accept `null` for collections the server may omit.
fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The server stores `length`/`duration` as free text, so accept numbers,
/// numeric strings, empty strings and `null`.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected numeric string, got {s:?}")))
        }
        other => Err(D::Error::custom(format!("expected number or string, got {other}"))),
    }
}
