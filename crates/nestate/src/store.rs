//! Single-slot snapshot storage with change notification.
//!
//! `SnapshotCell` wraps a `Mutex<Value>` holding the current snapshot.
//! Writes swap in a whole new snapshot (never patch in place) and then notify
//! subscribers outside the slot lock, so a listener may read the cell or
//! invoke setters without deadlock.

use crate::{NestateError, NestateResult, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifier for a registered snapshot listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct CellInner {
    slot: Mutex<Value>,
    version: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

/// Single-slot mutable cell holding the current snapshot.
///
/// Cloning shares the same slot; all handles observe the same snapshot and
/// the same listener registry. Writes are serialized, and every
/// `replace_with` sees the most recent stored snapshot at the time it runs.
#[derive(Clone)]
pub struct SnapshotCell {
    inner: Arc<CellInner>,
}

impl SnapshotCell {
    /// Create a new cell holding the given initial snapshot.
    pub fn new(value: Value) -> Self {
        Self {
            inner: Arc::new(CellInner {
                slot: Mutex::new(value),
                version: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Clone the current snapshot (cheap: reference bumps).
    pub fn snapshot(&self) -> Value {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new snapshot and notify subscribers.
    pub fn replace(&self, value: Value) {
        let mut guard = self
            .inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = value.clone();
        let version = self.bump_version();
        drop(guard);
        tracing::trace!(version, "snapshot replaced");
        self.notify(&value);
    }

    /// Atomic read-modify-write: `f` sees the most recent stored snapshot.
    pub fn replace_with<F>(&self, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let mut guard = self
            .inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let new_value = f(&guard);
        *guard = new_value.clone();
        let version = self.bump_version();
        drop(guard);
        tracing::trace!(version, "snapshot replaced");
        self.notify(&new_value);
    }

    /// Fallible read-modify-write: no swap and no notification on error.
    pub fn try_replace_with<F>(&self, f: F) -> NestateResult<()>
    where
        F: FnOnce(&Value) -> NestateResult<Value>,
    {
        let mut guard = self
            .inner
            .slot
            .lock()
            .map_err(|_| NestateError::invalid_operation("snapshot cell mutex poisoned"))?;
        let new_value = f(&guard)?;
        *guard = new_value.clone();
        let version = self.bump_version();
        drop(guard);
        tracing::trace!(version, "snapshot replaced");
        self.notify(&new_value);
        Ok(())
    }

    /// Register a listener invoked with each newly published snapshot.
    ///
    /// Listeners run synchronously in subscription order, outside the slot
    /// lock.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(f)));
        id
    }

    /// Remove a listener. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() < before
    }

    /// The number of successful replaces so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    fn bump_version(&self) -> u64 {
        self.inner.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    // Listener list is cloned out of its lock before invocation so a
    // listener may subscribe, unsubscribe, or invoke setters re-entrantly.
    fn notify(&self, value: &Value) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new(Value::empty_object())
    }
}

impl std::fmt::Debug for SnapshotCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCell")
            .field("version", &self.version())
            .finish()
    }
}
