//! Fixed-length value container.
//!
//! The length is set at construction and never changes. Every read hands out
//! a copy and every write copies in, so callers never alias stored elements.

use crate::bounds;
use crate::error::{InteropError, Result};

/// Iterator over element copies. Calling `iter()` again restarts it.
pub type Copies<'a, T> = std::iter::Cloned<std::slice::Iter<'a, T>>;

/// A fixed-length sequence with copy-in / copy-out element access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueArray<T> {
    items: Box<[T]>,
}

impl<T: Clone + Default> ValueArray<T> {
    /// Pre-size the array with `count` default values.
    pub fn new(count: usize) -> Self {
        Self {
            items: vec![T::default(); count].into_boxed_slice(),
        }
    }

    /// Like [`ValueArray::new`], but reports an unallocatable `count`
    /// instead of panicking.
    pub fn try_new(count: usize) -> Result<Self> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(count)
            .map_err(|e| InteropError::Argument(format!("cannot allocate {count} elements: {e}")))?;
        items.resize(count, T::default());
        Ok(Self {
            items: items.into_boxed_slice(),
        })
    }
}

impl<T: Clone> ValueArray<T> {
    /// Copy an externally supplied sequence.
    pub fn from_source(source: Option<&[T]>) -> Result<Self> {
        let source = source.ok_or(InteropError::NullInput("source"))?;
        Ok(Self {
            items: source.to_vec().into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy out the element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.items
            .get(index)
            .cloned()
            .ok_or_else(|| InteropError::index_range(index, self.items.len()))
    }

    /// Copy `value` into the slot at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| InteropError::index_range(index, len))?;
        *slot = value;
        Ok(())
    }

    /// Copy `count` elements starting at `src_start` into `dest[dest_start..]`.
    ///
    /// Slots of `dest` outside the window are never written.
    pub fn copy_to(
        &self,
        src_start: i64,
        dest: Option<&mut [T]>,
        dest_start: i64,
        count: i64,
    ) -> Result<()> {
        let dest = dest.ok_or(InteropError::NullInput("dest"))?;
        let window = bounds::copy_window(self.items.len(), src_start, dest.len(), dest_start, count)?;
        dest[window.dest].clone_from_slice(&self.items[window.src]);
        Ok(())
    }

    /// Reverse the whole array in place.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Reverse `[start, start + count)` in place.
    pub fn reverse_range(&mut self, start: i64, count: i64) -> Result<()> {
        let range = bounds::sub_range(self.items.len(), start, count)?;
        self.items[range].reverse();
        Ok(())
    }

    /// Overwrite every slot with a copy of `value`.
    pub fn fill(&mut self, value: T) {
        self.items.fill(value);
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }

    pub fn iter(&self) -> Copies<'_, T> {
        self.items.iter().cloned()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for ValueArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into_boxed_slice(),
        }
    }
}

impl<T> FromIterator<T> for ValueArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T: Clone> IntoIterator for &'a ValueArray<T> {
    type Item = T;
    type IntoIter = Copies<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
