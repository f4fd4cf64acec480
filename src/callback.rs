//! Identity-keyed callback registry.
//!
//! Native code only ever holds a [`CallbackId`]. The registry owns the
//! closure for as long as the registration is live, so dropping every
//! [`Registration`] handle does not make the closure unreachable.

use crate::error::{InteropError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a callback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Allocate a process-unique identity.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback #{}", self.0)
    }
}

/// Returned by [`CallbackRegistry::register`].
///
/// Holding or dropping it has no effect on the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Registration {
    id: CallbackId,
}

impl Registration {
    pub fn id(&self) -> CallbackId {
        self.id
    }
}

/// Table from identity to closure.
///
/// The closure is cloned out of the table before it runs, so a callback may
/// register or unregister slots (including its own) without deadlocking.
pub struct CallbackRegistry<F: ?Sized> {
    slots: Mutex<HashMap<CallbackId, Arc<F>>>,
}

impl<F: ?Sized> CallbackRegistry<F> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<CallbackId, Arc<F>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `callback` to `id`, replacing any previous closure.
    pub fn register(&self, id: CallbackId, callback: Arc<F>) -> Registration {
        if self.slots().insert(id, callback).is_some() {
            log::trace!("replaced closure for {id}");
        } else {
            log::trace!("registered {id}");
        }
        Registration { id }
    }

    /// Run `call` against the closure registered under `id`.
    pub fn invoke<R>(&self, id: CallbackId, call: impl FnOnce(&F) -> R) -> Result<R> {
        let callback = self.slots().get(&id).cloned();
        match callback {
            Some(cb) => Ok(call(&cb)),
            None => {
                log::warn!("invoked {id} with no live registration");
                Err(InteropError::UnknownCallback(id))
            }
        }
    }

    /// Drop the registration for `id`. Unknown identities are ignored.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let removed = self.slots().remove(&id).is_some();
        if removed {
            log::trace!("unregistered {id}");
        }
        removed
    }

    pub fn is_registered(&self, id: CallbackId) -> bool {
        self.slots().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }
}

impl<F: ?Sized> Default for CallbackRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}
