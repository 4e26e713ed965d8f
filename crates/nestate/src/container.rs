//! Nested-state container facade.
//!
//! `NestedState` wires the pieces together: it seeds a `SnapshotCell` with
//! the initial value, generates the setter mirror once (memoized on the
//! seed's identity), and exposes snapshot access, reset, and subscription.
//! Each container is caller-owned; independent containers never interfere.

use crate::{MirrorCache, NestateResult, Setters, SnapshotCell, SubscriptionId, Value};
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable capability exposing only `reset`.
///
/// Hand this to collaborators that may restore the initial snapshot but must
/// not write arbitrary state.
#[derive(Clone)]
pub struct ResetHandle {
    cell: SnapshotCell,
    initial: Arc<Mutex<Value>>,
}

impl ResetHandle {
    /// Restore the initial snapshot. Idempotent.
    pub fn reset(&self) {
        let initial = self
            .initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tracing::debug!("state reset to initial snapshot");
        self.cell.replace(initial);
    }
}

/// A nested-state container.
///
/// Construction takes an arbitrary initial value tree and yields three
/// capabilities: the current snapshot, a mirror of setters addressable at
/// every path of the initial tree (including the root), and a reset
/// operation restoring the initial snapshot.
///
/// # Examples
///
/// ```
/// use nestate::{NestedState, Value};
/// use serde_json::json;
///
/// let state = NestedState::new(json!({
///     "name": "John",
///     "age": 20,
///     "a": {"b": {"c": 10}},
/// }));
///
/// let setters = state.setters();
/// setters["name"].set("Jane");
/// setters["a"]["b"]["c"].set(11);
///
/// let snapshot = state.snapshot();
/// assert_eq!(snapshot.get("name"), Some(&Value::from("Jane")));
///
/// state.reset();
/// assert!(Value::ptr_eq(&state.snapshot(), &state.initial()));
/// ```
pub struct NestedState {
    cell: SnapshotCell,
    initial: Arc<Mutex<Value>>,
    mirror: Mutex<MirrorCache>,
}

impl NestedState {
    /// Create a container seeded with the given initial value.
    ///
    /// The setter mirror is generated eagerly from the initial tree's shape;
    /// it never observes later shape changes.
    pub fn new(initial: impl Into<Value>) -> Self {
        let initial = initial.into();
        let cell = SnapshotCell::new(initial.clone());
        let mut cache = MirrorCache::new();
        let mirror = cache.get_or_generate(&cell, &initial);
        tracing::debug!(
            kind = initial.kind(),
            paths = mirror.paths().len(),
            "nested state container created"
        );
        Self {
            cell,
            initial: Arc::new(Mutex::new(initial)),
            mirror: Mutex::new(cache),
        }
    }

    /// Parse the initial value from a JSON string.
    pub fn from_json_str(s: &str) -> NestateResult<Self> {
        Ok(Self::new(Value::from_json_str(s)?))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Value {
        self.cell.snapshot()
    }

    /// The root of the setter mirror.
    ///
    /// Repeated calls return handles to the identical node tree while the
    /// initial value's identity is unchanged.
    pub fn setters(&self) -> Setters {
        let initial = self
            .initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.mirror
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_generate(&self.cell, &initial)
    }

    /// Restore the initial snapshot.
    ///
    /// The published snapshot is the original initial reference itself (same
    /// `Arc`s, not a deep copy), so `Value::ptr_eq(snapshot, initial)` holds
    /// after reset. Idempotent; does not regenerate the mirror.
    pub fn reset(&self) {
        self.reset_handle().reset();
    }

    /// A handle to the initial value.
    pub fn initial(&self) -> Value {
        self.initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the initial value wholesale.
    ///
    /// The snapshot is reset to the new initial; the mirror is regenerated
    /// on the next `setters()` call only if the new seed's identity differs.
    pub fn reseed(&self, new_initial: impl Into<Value>) {
        let new_initial = new_initial.into();
        tracing::debug!(kind = new_initial.kind(), "container reseeded");
        *self
            .initial
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = new_initial.clone();
        self.cell.replace(new_initial);
    }

    /// Cloneable reset-only capability.
    pub fn reset_handle(&self) -> ResetHandle {
        ResetHandle {
            cell: self.cell.clone(),
            initial: Arc::clone(&self.initial),
        }
    }

    /// Register a listener invoked with each newly published snapshot.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.cell.subscribe(f)
    }

    /// Remove a listener. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.cell.unsubscribe(id)
    }

    /// The underlying storage handle, for hosts that drive notification
    /// wiring themselves.
    pub fn cell(&self) -> SnapshotCell {
        self.cell.clone()
    }

    /// Serialize the current snapshot to a JSON string.
    pub fn to_json_string(&self) -> NestateResult<String> {
        self.snapshot().to_json_string()
    }

    /// Serialize the current snapshot to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> NestateResult<String> {
        self.snapshot().to_json_string_pretty()
    }
}

impl std::fmt::Debug for NestedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedState")
            .field("cell", &self.cell)
            .finish()
    }
}
