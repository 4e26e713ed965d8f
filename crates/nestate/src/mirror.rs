//! Setter tree generator: a mirror of update handles over the state tree.
//!
//! The mirror is built from one recursive walk of the initial tree. Its shape
//! is a pure function of the initial tree's shape: every object-valued field
//! becomes an interior node with its own `set` plus children, every
//! array-valued or primitive-valued field becomes a leaf. Each node is bound
//! to a fixed path, not to data, so the mirror never needs regeneration when
//! snapshots change.

use crate::{set_at, try_update_at, update_at, NestateResult, Path, SnapshotCell, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shape tag for a mirror node, resolved once during generation.
///
/// Nodes are never re-inspected at update time; the tag recorded here is the
/// tag the initial tree had. `Null` is classed `Primitive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Object-valued node: has a setter and child nodes.
    Object,
    /// Array-valued leaf: its setter replaces the whole array.
    Array,
    /// Primitive-valued leaf (including null).
    Primitive,
}

impl Shape {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Shape::Object,
            Value::Array(_) => Shape::Array,
            _ => Shape::Primitive,
        }
    }
}

struct SetterNode {
    path: Path,
    shape: Shape,
    cell: SnapshotCell,
    children: BTreeMap<String, Setters>,
}

/// A node of the setter mirror.
///
/// Cheaply cloneable handle (`Arc` inside). The root node's `set` replaces
/// the entire snapshot; every other node's `set` replaces the value at its
/// bound path via the copy-on-path update engine.
///
/// # Examples
///
/// ```
/// use nestate::NestedState;
/// use serde_json::json;
///
/// let state = NestedState::new(json!({"a": {"b": {"c": 10}}}));
/// let setters = state.setters();
/// setters["a"]["b"]["c"].set(11);
/// assert_eq!(state.snapshot(), json!({"a": {"b": {"c": 11}}}).into());
/// ```
#[derive(Clone)]
pub struct Setters {
    node: Arc<SetterNode>,
}

impl Setters {
    /// Generate the mirror for a seed tree, bound to a snapshot cell.
    ///
    /// One recursive walk; a `Null` or non-object seed yields a childless
    /// root, never an error.
    pub fn generate(cell: &SnapshotCell, seed: &Value) -> Setters {
        Self::generate_node(cell, seed, Path::root())
    }

    fn generate_node(cell: &SnapshotCell, node: &Value, path: Path) -> Setters {
        let mut children = BTreeMap::new();
        if let Value::Object(fields) = node {
            for (key, value) in fields.iter() {
                let child_path = path.clone().key(key.clone());
                children.insert(key.clone(), Self::generate_node(cell, value, child_path));
            }
        }
        Setters {
            node: Arc::new(SetterNode {
                path,
                shape: Shape::of(node),
                cell: cell.clone(),
                children,
            }),
        }
    }

    /// Replace the value at this node's path and publish the new snapshot.
    ///
    /// At the root this replaces the whole snapshot. Infallible: missing
    /// intermediates are created, non-object intermediates overwritten.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        let path = &self.node.path;
        self.node
            .cell
            .replace_with(|current| set_at(current, path, value));
    }

    /// Update the value at this node's path with a function of the previous
    /// value (missing resolves to `Value::Null`).
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let path = &self.node.path;
        self.node
            .cell
            .replace_with(|current| update_at(current, path, f));
    }

    /// Update fallibly: a failing updater leaves the snapshot untouched and
    /// propagates the error.
    pub fn try_update<F>(&self, f: F) -> NestateResult<()>
    where
        F: FnOnce(&Value) -> NestateResult<Value>,
    {
        let path = &self.node.path;
        self.node
            .cell
            .try_replace_with(|current| try_update_at(current, path, f))
    }

    /// The path this node is bound to.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.node.path
    }

    /// The shape tag recorded at generation time.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.node.shape
    }

    /// Returns true if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.children.is_empty()
    }

    /// The number of child nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.node.children.len()
    }

    /// Returns true if this node has no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node.children.is_empty()
    }

    /// Get the child node for a field.
    #[inline]
    pub fn child(&self, key: &str) -> Option<&Setters> {
        self.node.children.get(key)
    }

    /// Iterate over child field names and nodes.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Setters)> {
        self.node.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every addressable path in the mirror, root first, in depth-first
    /// field order.
    pub fn paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths(&self, out: &mut Vec<Path>) {
        out.push(self.node.path.clone());
        for child in self.node.children.values() {
            child.collect_paths(out);
        }
    }

    /// Identity comparison: true when both handles point at the same node.
    pub fn ptr_eq(a: &Setters, b: &Setters) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }
}

impl std::ops::Index<&str> for Setters {
    type Output = Setters;

    fn index(&self, key: &str) -> &Setters {
        self.child(key)
            .unwrap_or_else(|| panic!("no setter for field `{key}` at {}", self.node.path))
    }
}

impl std::fmt::Debug for Setters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setters")
            .field("path", &self.node.path)
            .field("shape", &self.node.shape)
            .field("children", &self.node.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Memoizes mirror generation keyed on the identity of the seed value.
///
/// `get_or_generate` returns the cached tree while the seed identity
/// (`Value::ptr_eq`) is unchanged and regenerates otherwise, so repeated
/// lookups and identity-preserving reseeds never rebuild the mirror.
pub struct MirrorCache {
    cached: Option<(Value, Setters)>,
}

impl MirrorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Get the mirror for a seed, generating it only when the seed identity
    /// differs from the cached one.
    pub fn get_or_generate(&mut self, cell: &SnapshotCell, seed: &Value) -> Setters {
        if let Some((cached_seed, mirror)) = &self.cached {
            if Value::ptr_eq(cached_seed, seed) {
                return mirror.clone();
            }
        }
        let mirror = Setters::generate(cell, seed);
        tracing::debug!(paths = mirror.paths().len(), "setter mirror generated");
        self.cached = Some((seed.clone(), mirror.clone()));
        mirror
    }
}

impl Default for MirrorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    fn cell_with(v: serde_json::Value) -> (SnapshotCell, Value) {
        let seed = Value::from(v);
        (SnapshotCell::new(seed.clone()), seed)
    }

    #[test]
    fn test_generate_mirrors_object_shape() {
        let (cell, seed) = cell_with(json!({"name": "John", "a": {"b": {"c": 10}}}));
        let root = Setters::generate(&cell, &seed);

        assert_eq!(root.shape(), Shape::Object);
        assert_eq!(root.len(), 2);
        assert_eq!(root["name"].shape(), Shape::Primitive);
        assert!(root["name"].is_leaf());
        assert_eq!(root["a"].shape(), Shape::Object);
        assert_eq!(root["a"]["b"]["c"].path(), &path!("a", "b", "c"));
    }

    #[test]
    fn test_arrays_are_leaves() {
        let (cell, seed) = cell_with(json!({"items": [{"deep": 1}, 2]}));
        let root = Setters::generate(&cell, &seed);
        assert_eq!(root["items"].shape(), Shape::Array);
        assert!(root["items"].is_leaf());
    }

    #[test]
    fn test_null_seed_yields_childless_root() {
        let (cell, seed) = cell_with(json!(null));
        let root = Setters::generate(&cell, &seed);
        assert!(root.is_leaf());
        assert_eq!(root.shape(), Shape::Primitive);
        assert_eq!(root.paths(), vec![Path::root()]);
    }

    #[test]
    fn test_null_field_is_leaf() {
        let (cell, seed) = cell_with(json!({"maybe": null}));
        let root = Setters::generate(&cell, &seed);
        assert_eq!(root["maybe"].shape(), Shape::Primitive);
        assert!(root["maybe"].is_leaf());
    }

    #[test]
    fn test_paths_root_first() {
        let (cell, seed) = cell_with(json!({"a": {"b": 1}, "z": 2}));
        let root = Setters::generate(&cell, &seed);
        assert_eq!(
            root.paths(),
            vec![Path::root(), path!("a"), path!("a", "b"), path!("z")]
        );
    }

    #[test]
    fn test_set_publishes_to_cell() {
        let (cell, seed) = cell_with(json!({"a": {"b": 1}}));
        let root = Setters::generate(&cell, &seed);
        root["a"]["b"].set(2);
        assert_eq!(
            cell.snapshot().get_path(&path!("a", "b")),
            Some(&Value::from(2))
        );
    }

    #[test]
    fn test_root_set_replaces_everything() {
        let (cell, seed) = cell_with(json!({"a": 1}));
        let root = Setters::generate(&cell, &seed);
        root.set(Value::from(json!({"b": 2})));
        assert_eq!(cell.snapshot(), Value::from(json!({"b": 2})));
    }

    #[test]
    fn test_try_update_abort_leaves_snapshot() {
        let (cell, seed) = cell_with(json!({"count": 1}));
        let root = Setters::generate(&cell, &seed);
        let err = root["count"]
            .try_update(|_| {
                Err(crate::NestateError::update_aborted(
                    path!("count"),
                    "no",
                ))
            })
            .unwrap_err();
        assert!(matches!(err, crate::NestateError::UpdateAborted { .. }));
        assert_eq!(cell.snapshot(), Value::from(json!({"count": 1})));
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn test_index_panics_on_unknown_field() {
        let (cell, seed) = cell_with(json!({"a": 1}));
        let root = Setters::generate(&cell, &seed);
        let result = std::panic::catch_unwind(|| root["nope"].shape());
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_stable_for_same_identity() {
        let (cell, seed) = cell_with(json!({"a": 1}));
        let mut cache = MirrorCache::new();
        let first = cache.get_or_generate(&cell, &seed);
        let second = cache.get_or_generate(&cell, &seed.clone());
        assert!(Setters::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_regenerates_for_new_identity() {
        let (cell, seed) = cell_with(json!({"a": 1}));
        let mut cache = MirrorCache::new();
        let first = cache.get_or_generate(&cell, &seed);
        let other = Value::from(json!({"a": 1}));
        let second = cache.get_or_generate(&cell, &other);
        assert!(!Setters::ptr_eq(&first, &second));
    }
}
