//! Nested-state container with path-addressed setters and structural sharing.
//!
//! `nestate` takes an arbitrary initial value tree and produces three things:
//!
//! - **Snapshot**: the current state value, replaced wholesale on every update
//! - **Setter mirror**: a tree of update handles isomorphic to the initial
//!   tree's shape, addressable at every path including the root
//! - **Reset**: restores the initial snapshot (the original reference itself)
//!
//! Updates go through a copy-on-path engine: the new snapshot shares every
//! untouched subtree with the previous one by `Arc`, so downstream consumers
//! can detect change with cheap identity comparison (`Value::ptr_eq`).
//!
//! # Quick Start
//!
//! ```
//! use nestate::{NestedState, Value};
//! use serde_json::json;
//!
//! let state = NestedState::new(json!({
//!     "name": "John",
//!     "age": 20,
//!     "a": {"b": {"c": 10}},
//! }));
//!
//! let setters = state.setters();
//! setters["name"].set("Jane");
//! setters["age"].update(|prev| Value::from(prev.as_i64().unwrap_or(0) + 1));
//! setters["a"]["b"]["c"].set(11);
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.get("name"), Some(&Value::from("Jane")));
//! assert_eq!(snapshot.get("age"), Some(&Value::from(21)));
//!
//! // Untouched siblings keep their identity across snapshots.
//! state.reset();
//! assert!(Value::ptr_eq(&state.snapshot(), &state.initial()));
//! ```
//!
//! # Pure update functions
//!
//! The engine is also usable standalone, without a container:
//!
//! ```
//! use nestate::{path, set_at, update_at, Value};
//! use serde_json::json;
//!
//! let doc = Value::from(json!({"a": {"b": 1}}));
//! let next = set_at(&doc, &path!("a", "b"), Value::from(2));
//! let next = update_at(&next, &path!("a", "b"), |prev| {
//!     Value::from(prev.as_i64().unwrap_or(0) * 10)
//! });
//! assert_eq!(next.get_path(&path!("a", "b")), Some(&Value::from(20)));
//! ```

mod container;
mod error;
mod mirror;
mod path;
mod store;
mod update;
mod value;

pub use container::{NestedState, ResetHandle};
pub use error::{NestateError, NestateResult};
pub use mirror::{MirrorCache, Setters, Shape};
pub use path::Path;
pub use store::{SnapshotCell, SubscriptionId};
pub use update::{get_at, set_at, try_update_at, update_at};
pub use value::{Number, Value};
