//! Id-keyed cache of live visual handles.
//!
//! DESIGN
//! ======
//! The cache is a rendering aid, never a source of truth: it maps an entity id
//! to the handle of the visual currently drawn for it, plus whatever the click
//! handler needs. `insert`/`remove` are the only mutators; `insert` hands back
//! the replaced entry so the caller can detach the old visual.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::hash::Hash;

/// A live handle and the detail captured when it was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Tracked<H, V> {
    pub handle: H,
    pub detail: V,
}

#[derive(Debug)]
pub struct HandleCache<K, H, V> {
    entries: HashMap<K, Tracked<H, V>>,
}

impl<K, H, V> Default for HandleCache<K, H, V> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<K, H, V> HandleCache<K, H, V>
where
    K: Copy + Eq + Hash,
    H: Copy + PartialEq,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `handle` for `key`; returns the entry it replaced.
    pub fn insert(&mut self, key: K, handle: H, detail: V) -> Option<Tracked<H, V>> {
        self.entries.insert(key, Tracked { handle, detail })
    }

    pub fn remove(&mut self, key: K) -> Option<Tracked<H, V>> {
        self.entries.remove(&key)
    }

    #[must_use]
    pub fn get(&self, key: K) -> Option<&Tracked<H, V>> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Reverse lookup from a handle reported by a surface event.
    #[must_use]
    pub fn key_for(&self, handle: H) -> Option<K> {
        self.entries
            .iter()
            .find_map(|(k, t)| (t.handle == handle).then_some(*k))
    }

    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.entries.values().map(|t| t.handle)
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
