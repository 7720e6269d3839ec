//! Bundle store: the page-local mirror of the server's bundle tree.
//!
//! SYSTEM CONTEXT
//! ==============
//! Bundles own their paths and paths own their places, so this store is the
//! only place entities live. Paths and places are reached by walking the tree;
//! they are never cached separately.
//!
//! DESIGN
//! ======
//! Mutations happen only after the server has answered. A failed call leaves
//! the map untouched and hands the error back to the caller. Removal of
//! nested entities rebuilds the owning sequence without the matches rather
//! than splicing while iterating.

#[cfg(test)]
#[path = "bundles_test.rs"]
mod bundles_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::net::api::BundleApi;
use crate::net::payload::BundlePayload;
use crate::net::types::{Bundle, BundleId, Path, PathId, Place, PlaceId};

pub struct BundleStore {
    api: Arc<dyn BundleApi>,
    bundles: BTreeMap<BundleId, Bundle>,
}

impl BundleStore {
    pub fn new(api: Arc<dyn BundleApi>) -> Self {
        Self { api, bundles: BTreeMap::new() }
    }

    /// Fetch the full tree once and merge it into the local map.
    ///
    /// Fetched bundles replace local entries with the same id; local entries
    /// the server did not return are kept.
    ///
    /// # Errors
    ///
    /// Returns the API error; the local map is left untouched.
    pub async fn load(&mut self) -> Result<&BTreeMap<BundleId, Bundle>, ApiError> {
        let fetched = self.api.list_bundles().await?;
        let count = fetched.len();
        for bundle in fetched {
            match bundle.id {
                Some(id) => {
                    self.bundles.insert(id, bundle);
                }
                None => tracing::warn!(name = %bundle.name, "skipping bundle without id"),
            }
        }
        tracing::debug!(count, total = self.bundles.len(), "bundles loaded");
        Ok(&self.bundles)
    }

    #[must_use]
    pub fn bundles(&self) -> &BTreeMap<BundleId, Bundle> {
        &self.bundles
    }

    #[must_use]
    pub fn get(&self, id: BundleId) -> Option<&Bundle> {
        self.bundles.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: BundleId) -> bool {
        self.bundles.contains_key(&id)
    }

    /// Create a bundle from a draft and insert the server's copy.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a parse error if the response carries no id.
    pub async fn create_bundle(&mut self, draft: &Bundle) -> Result<Bundle, ApiError> {
        let created = self.api.create_bundle(&BundlePayload::from(draft)).await?;
        self.absorb(created)
    }

    /// Update a bundle's scalar fields from a draft.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a parse error if the response carries no id.
    pub async fn update_bundle(&mut self, id: BundleId, draft: &Bundle) -> Result<Bundle, ApiError> {
        let updated = self.api.update_bundle(id, &BundlePayload::from(draft)).await?;
        self.absorb(updated)
    }

    /// Delete a bundle; returns the removed local copy (with its paths) so the
    /// caller can tear down visuals for everything nested in it.
    ///
    /// # Errors
    ///
    /// Returns the API error; the bundle stays in the map.
    pub async fn delete_bundle(&mut self, id: BundleId) -> Result<Option<Bundle>, ApiError> {
        self.api.delete_bundle(id).await?;
        let removed = self.bundles.remove(&id);
        tracing::debug!(%id, found = removed.is_some(), "bundle removed");
        Ok(removed)
    }

    /// Insert a new bundle, or copy name/info/image onto an existing one.
    fn absorb(&mut self, response: Bundle) -> Result<Bundle, ApiError> {
        let id = response
            .id
            .ok_or_else(|| ApiError::Parse("bundle response has no id".into()))?;
        match self.bundles.get_mut(&id) {
            Some(current) => {
                current.name.clone_from(&response.name);
                current.info.clone_from(&response.info);
                current.image.clone_from(&response.image);
                tracing::debug!(%id, "bundle updated");
                Ok(current.clone())
            }
            None => {
                tracing::debug!(%id, "bundle inserted");
                self.bundles.insert(id, response.clone());
                Ok(response)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Nested entities
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.bundles
            .values()
            .flat_map(|b| b.paths.iter())
            .find(|p| p.id == Some(id))
    }

    pub fn path_mut(&mut self, id: PathId) -> Option<&mut Path> {
        self.bundles
            .values_mut()
            .flat_map(|b| b.paths.iter_mut())
            .find(|p| p.id == Some(id))
    }

    #[must_use]
    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.bundles
            .values()
            .flat_map(|b| b.paths.iter())
            .flat_map(|p| p.places.iter())
            .find(|pl| pl.id == Some(id))
    }

    pub fn place_mut(&mut self, id: PlaceId) -> Option<&mut Place> {
        self.bundles
            .values_mut()
            .flat_map(|b| b.paths.iter_mut())
            .flat_map(|p| p.places.iter_mut())
            .find(|pl| pl.id == Some(id))
    }

    /// Append a created path to its bundle. Returns `None` when the parent
    /// bundle is gone (or the path has no id/parent), leaving the store as is.
    pub fn insert_path(&mut self, path: Path) -> Option<&Path> {
        let id = path.id?;
        let bundle = self.bundles.get_mut(&path.bundle_id?)?;
        match bundle.paths.iter().position(|p| p.id == Some(id)) {
            Some(index) => {
                bundle.paths[index] = path;
                Some(&bundle.paths[index])
            }
            None => {
                bundle.paths.push(path);
                bundle.paths.last()
            }
        }
    }

    /// Append a created place to its path. Returns `None` when the parent
    /// path is gone.
    pub fn insert_place(&mut self, place: Place) -> Option<&Place> {
        let id = place.id?;
        let parent = self.path_mut(place.path_id?)?;
        match parent.places.iter().position(|p| p.id == Some(id)) {
            Some(index) => {
                parent.places[index] = place;
                Some(&parent.places[index])
            }
            None => {
                parent.places.push(place);
                parent.places.last()
            }
        }
    }

    /// Remove every path with `id` from every bundle; returns what was removed.
    pub fn remove_path(&mut self, id: PathId) -> Vec<Path> {
        let mut removed = Vec::new();
        for bundle in self.bundles.values_mut() {
            let (gone, kept): (Vec<Path>, Vec<Path>) =
                std::mem::take(&mut bundle.paths).into_iter().partition(|p| p.id == Some(id));
            bundle.paths = kept;
            removed.extend(gone);
        }
        tracing::debug!(%id, removed = removed.len(), "path removed");
        removed
    }

    /// Remove every place with `id` from every path; returns what was removed.
    pub fn remove_place(&mut self, id: PlaceId) -> Vec<Place> {
        let mut removed = Vec::new();
        for path in self.bundles.values_mut().flat_map(|b| b.paths.iter_mut()) {
            let (gone, kept): (Vec<Place>, Vec<Place>) =
                std::mem::take(&mut path.places).into_iter().partition(|p| p.id == Some(id));
            path.places = kept;
            removed.extend(gone);
        }
        tracing::debug!(%id, removed = removed.len(), "place removed");
        removed
    }
}

// =============================================================================
// TREE WALK
// =============================================================================

/// One entity visited while walking the tree.
#[derive(Clone, Copy, Debug)]
pub enum EntityRef<'a> {
    Path(&'a Path),
    Place(&'a Place),
}

/// Lazy walk over every path and place: each path is yielded before its places.
pub fn walk<'a, I>(bundles: I) -> impl Iterator<Item = EntityRef<'a>>
where
    I: IntoIterator<Item = &'a Bundle>,
{
    bundles.into_iter().flat_map(|bundle| {
        bundle.paths.iter().flat_map(|path| {
            std::iter::once(EntityRef::Path(path)).chain(path.places.iter().map(EntityRef::Place))
        })
    })
}
