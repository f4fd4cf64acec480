//! Growable sequence container.
//!
//! Native code decides value-vs-reference at the container declaration
//! (`vector<T>` versus `vector<T*>`), managed code decides it at the element
//! type declaration. The list therefore takes its element semantics as an
//! explicit parameter: [`ValueList`] hands out disconnected copies,
//! [`RefList`] hands out live [`Alias`]es of the stored element.

use crate::bounds;
use crate::error::{InteropError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How elements move in and out of a [`GrowableList`].
pub trait ElementSemantics {
    /// What callers pass in and get back.
    type Item;
    /// What the list keeps.
    type Stored;

    fn store(item: Self::Item) -> Self::Stored;
    fn load(stored: &Self::Stored) -> Self::Item;
}

/// Elements are copied on every read and write.
pub struct CopySemantics<T>(PhantomData<fn() -> T>);

impl<T: Clone> ElementSemantics for CopySemantics<T> {
    type Item = T;
    type Stored = T;

    fn store(item: T) -> T {
        item
    }

    fn load(stored: &T) -> T {
        stored.clone()
    }
}

/// Elements are shared: a read returns another handle to the stored element.
pub struct AliasSemantics<T>(PhantomData<fn() -> T>);

impl<T> ElementSemantics for AliasSemantics<T> {
    type Item = Alias<T>;
    type Stored = Alias<T>;

    fn store(item: Alias<T>) -> Alias<T> {
        item
    }

    fn load(stored: &Alias<T>) -> Alias<T> {
        stored.clone()
    }
}

/// Shared handle to an element held by reference.
pub struct Alias<T>(Arc<Mutex<T>>);

impl<T> Alias<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the aliased element.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Mutate the aliased element; every other alias observes the change.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// True if both handles refer to the same element.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Alias<T> {
    /// Detached copy of the current element value.
    pub fn snapshot(&self) -> T {
        self.lock().clone()
    }
}

impl<T> Clone for Alias<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Alias<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| f.debug_tuple("Alias").field(v).finish())
    }
}

/// A variable-length sequence whose element semantics are fixed by `S`.
pub struct GrowableList<S: ElementSemantics> {
    items: Vec<S::Stored>,
}

/// List of disconnected copies.
pub type ValueList<T> = GrowableList<CopySemantics<T>>;

/// List of shared elements.
pub type RefList<T> = GrowableList<AliasSemantics<T>>;

impl<S: ElementSemantics> GrowableList<S> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build from an externally supplied sequence.
    pub fn from_source(source: Option<&[S::Item]>) -> Result<Self>
    where
        S::Item: Clone,
    {
        let source = source.ok_or(InteropError::NullInput("source"))?;
        Ok(source.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: S::Item) {
        self.items.push(S::store(item));
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, item: S::Item) -> Result<()> {
        if index > self.items.len() {
            return Err(InteropError::index_range(index, self.items.len()));
        }
        self.items.insert(index, S::store(item));
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<S::Item> {
        self.items
            .get(index)
            .map(S::load)
            .ok_or_else(|| InteropError::index_range(index, self.items.len()))
    }

    pub fn set(&mut self, index: usize, item: S::Item) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| InteropError::index_range(index, len))?;
        *slot = S::store(item);
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<S::Item> {
        if index >= self.items.len() {
            return Err(InteropError::index_range(index, self.items.len()));
        }
        let removed = self.items.remove(index);
        Ok(S::load(&removed))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Same contract as [`crate::array::ValueArray::copy_to`].
    pub fn copy_to(
        &self,
        src_start: i64,
        dest: Option<&mut [S::Item]>,
        dest_start: i64,
        count: i64,
    ) -> Result<()> {
        let dest = dest.ok_or(InteropError::NullInput("dest"))?;
        let window = bounds::copy_window(self.items.len(), src_start, dest.len(), dest_start, count)?;
        for (slot, stored) in dest[window.dest].iter_mut().zip(&self.items[window.src]) {
            *slot = S::load(stored);
        }
        Ok(())
    }

    pub fn to_vec(&self) -> Vec<S::Item> {
        self.items.iter().map(S::load).collect()
    }

    pub fn iter(&self) -> Iter<'_, S> {
        Iter {
            inner: self.items.iter(),
        }
    }
}

impl<S: ElementSemantics> Default for GrowableList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ElementSemantics> Clone for GrowableList<S>
where
    S::Stored: Clone,
{
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<S: ElementSemantics> fmt::Debug for GrowableList<S>
where
    S::Stored: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<S: ElementSemantics> PartialEq for GrowableList<S>
where
    S::Stored: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<S: ElementSemantics> FromIterator<S::Item> for GrowableList<S> {
    fn from_iter<I: IntoIterator<Item = S::Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(S::store).collect(),
        }
    }
}

impl<T: Clone> From<Vec<T>> for ValueList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone + Serialize> Serialize for ValueList<T> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'de, T: Clone + Deserialize<'de>> Deserialize<'de> for ValueList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Forward iterator over a [`GrowableList`], yielding loaded items.
pub struct Iter<'a, S: ElementSemantics> {
    inner: std::slice::Iter<'a, S::Stored>,
}

impl<S: ElementSemantics> Iterator for Iter<'_, S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        self.inner.next().map(S::load)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: ElementSemantics> ExactSizeIterator for Iter<'_, S> {}

impl<'a, S: ElementSemantics> IntoIterator for &'a GrowableList<S> {
    type Item = S::Item;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApplicationSettings;

    fn named(name: &str) -> ApplicationSettings {
        ApplicationSettings {
            application_name: name.to_string(),
            ..Default::default()
        }
    }

    fn many(num: usize) -> Vec<ApplicationSettings> {
        (0..num).map(|i| named(&i.to_string())).collect()
    }

    fn names(list: &ValueList<ApplicationSettings>) -> Vec<String> {
        list.iter().map(|s| s.application_name).collect()
    }

    #[test]
    fn test_new_list_is_empty() {
        let list = ValueList::<ApplicationSettings>::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_list_is_in_sequence() {
        let list = ValueList::from_source(Some(many(5).as_slice())).unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(names(&list), vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_null_construction_fails() {
        let result = ValueList::<ApplicationSettings>::from_source(None);
        assert!(matches!(result, Err(InteropError::NullInput("source"))));
    }

    #[test]
    fn test_push_appends() {
        let mut list = ValueList::new();
        list.push(named("One"));
        assert_eq!(list.get(0).unwrap().application_name, "One");
        list.push(named("Two"));
        assert_eq!(names(&list), vec!["One", "Two"]);
    }

    #[test]
    fn test_insert_adds_before() {
        let mut list = ValueList::new();
        list.push(named("One"));
        list.push(named("Three"));
        list.insert(1, named("Two")).unwrap();
        assert_eq!(names(&list), vec!["One", "Two", "Three"]);
        list.insert(1, named("OnePointFive")).unwrap();
        assert_eq!(names(&list), vec!["One", "OnePointFive", "Two", "Three"]);
        list.insert(4, named("Four")).unwrap();
        assert_eq!(list.len(), 5);
        assert!(matches!(list.insert(6, named("Nope")), Err(InteropError::Range { .. })));
    }

    #[test]
    fn test_value_list_elements_are_disconnected() {
        let mut list = ValueList::new();
        let one = named("One");
        list.push(one.clone());

        let mut got = list.get(0).unwrap();
        assert_eq!(got.application_name, one.application_name);
        got.application_name = "Two".into();
        assert_eq!(list.get(0).unwrap().application_name, "One");

        list.set(0, named("Two")).unwrap();
        assert_eq!(one.application_name, "One");
        assert_eq!(list.get(0).unwrap().application_name, "Two");
    }

    #[test]
    fn test_ref_list_elements_alias() {
        let mut list = RefList::new();
        let one = Alias::new(named("One"));
        list.push(one.clone());

        let got = list.get(0).unwrap();
        assert!(got.ptr_eq(&one));
        got.update(|s| s.application_name = "Two".into());
        assert_eq!(one.snapshot().application_name, "Two");
        assert_eq!(list.get(0).unwrap().snapshot().application_name, "Two");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut list = ValueList::from(many(3));
        let removed = list.remove_at(1).unwrap();
        assert_eq!(removed.application_name, "1");
        assert_eq!(names(&list), vec!["0", "2"]);
        assert!(matches!(list.remove_at(2), Err(InteropError::Range { .. })));
        assert_eq!(
            list.get(usize::MAX).unwrap_err(),
            InteropError::Range {
                param: "index",
                value: i64::MAX,
                len: 2,
            }
        );
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_copy_to() {
        let list = ValueList::from(many(3));
        let mut dest = vec![ApplicationSettings::default(); 3];
        list.copy_to(0, Some(&mut dest), 0, 3).unwrap();
        assert_eq!(dest, list.to_vec());
    }

    #[test]
    fn test_partial_copy_to() {
        let list = ValueList::from(many(5));
        let mut dest = vec![ApplicationSettings::default(); 10];
        list.copy_to(2, Some(&mut dest), 7, 3).unwrap();

        assert_eq!(dest[0], ApplicationSettings::default());
        assert_eq!(dest[7].application_name, "2");
        assert_eq!(dest[8].application_name, "3");
        assert_eq!(dest[9].application_name, "4");
    }

    #[test]
    fn test_copy_to_errors() {
        let list = ValueList::from(many(5));
        let mut dest = vec![ApplicationSettings::default(); 10];

        assert!(matches!(list.copy_to(0, None, 0, 0), Err(InteropError::NullInput("dest"))));
        assert!(matches!(list.copy_to(-1, Some(&mut dest), 0, 0), Err(InteropError::Range { .. })));
        assert!(matches!(list.copy_to(0, Some(&mut dest), -1, 0), Err(InteropError::Range { .. })));
        assert!(matches!(list.copy_to(0, Some(&mut dest), 0, -1), Err(InteropError::Range { .. })));
        assert!(matches!(list.copy_to(0, Some(&mut dest), 0, 11), Err(InteropError::Argument(_))));
    }

    #[test]
    fn test_iteration_restarts() {
        let list = ValueList::from(many(5));
        let filtered: Vec<_> = list
            .iter()
            .filter(|s| s.application_name == "1" || s.application_name == "2")
            .collect();
        assert_eq!(filtered.first().unwrap().application_name, "1");
        assert_eq!(filtered.last().unwrap().application_name, "2");

        let mut count = 0;
        for (i, s) in (&list).into_iter().enumerate() {
            assert_eq!(s.application_name, i.to_string());
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_serde_as_sequence() {
        let list = ValueList::from(vec![1, 2, 3]);
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: ValueList<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
