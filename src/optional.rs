//! Optional value at the boundary.
//!
//! An absent managed reference maps to "no value", never to a fault.

use crate::error::{InteropError, Result};

/// Presence flag plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalSlot<T> {
    value: Option<T>,
}

impl<T> Default for OptionalSlot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: Clone> OptionalSlot<T> {
    /// An absent slot.
    pub fn none() -> Self {
        Self::default()
    }

    /// Copy in `source` if present.
    pub fn from_ref(source: Option<&T>) -> Self {
        Self {
            value: source.cloned(),
        }
    }

    /// Copy in `source`; `None` moves the slot back to absent.
    pub fn assign(&mut self, source: Option<&T>) {
        self.value = source.cloned();
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Copy out the payload, or `None` if absent.
    pub fn get(&self) -> Option<T> {
        self.value.clone()
    }

    /// Copy out the payload, failing if absent.
    pub fn value(&self) -> Result<T> {
        self.value.clone().ok_or(InteropError::EmptyOptional)
    }

    /// Borrow the payload, failing if absent.
    pub fn value_ref(&self) -> Result<&T> {
        self.value.as_ref().ok_or(InteropError::EmptyOptional)
    }

    /// Move the payload out, leaving the slot absent.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

impl<T> From<Option<T>> for OptionalSlot<T> {
    fn from(value: Option<T>) -> Self {
        Self { value }
    }
}

impl<T> From<OptionalSlot<T>> for Option<T> {
    fn from(slot: OptionalSlot<T>) -> Self {
        slot.value
    }
}
