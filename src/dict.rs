//! Associative container.
//!
//! Keys are unique and enumerate in ascending order, matching the ordered
//! map on the native side.

use crate::bounds;
use crate::error::{InteropError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::Debug;

/// Key/value map with copy-out reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dict<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + Clone + Debug, V: Clone> Dict<K, V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Deep copy of another map. The two never share state afterwards.
    pub fn copy_of(other: Option<&Self>) -> Result<Self> {
        other.cloned().ok_or(InteropError::NullInput("other"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy out the value stored under `key`.
    pub fn get(&self, key: &K) -> Result<V> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| InteropError::KeyNotFound(format!("{key:?}")))
    }

    /// Insert or overwrite.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Insert a new key. Fails without touching the map if `key` exists.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        match self.entries.entry(key) {
            btree_map::Entry::Occupied(e) => Err(InteropError::DuplicateKey(format!("{:?}", e.key()))),
            btree_map::Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    pub fn add_pair(&mut self, (key, value): (K, V)) -> Result<()> {
        self.add(key, value)
    }

    /// Lookup that reports absence instead of failing.
    pub fn try_get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns whether `key` was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    /// Values in the same order as [`Dict::keys`].
    pub fn values(&self) -> Vec<V> {
        self.entries.values().cloned().collect()
    }

    /// Copy every pair into `dest[dest_start..]`.
    pub fn copy_to(&self, dest: Option<&mut [(K, V)]>, dest_start: i64) -> Result<()> {
        let dest = dest.ok_or(InteropError::NullInput("dest"))?;
        let window = bounds::whole_copy_window(self.entries.len(), dest.len(), dest_start)?;
        for (slot, (k, v)) in dest[window].iter_mut().zip(&self.entries) {
            *slot = (k.clone(), v.clone());
        }
        Ok(())
    }

    pub fn iter(&self) -> Pairs<'_, K, V> {
        Pairs {
            inner: self.entries.iter(),
        }
    }
}

impl<K: Ord + Clone + Debug, V: Clone + PartialEq> Dict<K, V> {
    /// True only if `key` is present and maps to a value equal to `value`.
    pub fn contains_pair(&self, key: &K, value: &V) -> bool {
        self.entries.get(key).is_some_and(|v| v == value)
    }

    /// Remove `key` only if it maps to a value equal to `value`.
    pub fn remove_pair(&mut self, key: &K, value: &V) -> bool {
        if !self.contains_pair(key, value) {
            return false;
        }
        self.entries.remove(key).is_some()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Dict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Iterator over copied key/value pairs.
pub struct Pairs<'a, K, V> {
    inner: btree_map::Iter<'a, K, V>,
}

impl<K: Clone, V: Clone> Iterator for Pairs<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|(k, v)| (k.clone(), v.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for Pairs<'_, K, V> {}

impl<'a, K: Ord + Clone + Debug, V: Clone> IntoIterator for &'a Dict<K, V> {
    type Item = (K, V);
    type IntoIter = Pairs<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `Map<String, String>` as exposed to managed code.
pub type StringDict = Dict<String, String>;
