//! Path representation for addressing nodes in the state tree.
//!
//! A path is an ordered sequence of field names from root to a target field.
//! Paths are derived once from the initial tree's shape at mirror construction
//! and never change afterward. Array indices never appear in a path: arrays
//! are replaced wholesale, never addressed per element.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path into the state tree.
///
/// The empty path is the root. Use builder methods to construct paths
/// incrementally.
///
/// # Examples
///
/// ```
/// use nestate::Path;
///
/// let path = Path::root().key("user").key("name");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "$.user.name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<String>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty path (alias for `new`).
    #[inline]
    pub fn root() -> Self {
        Self::new()
    }

    /// Create a path from a vector of keys.
    #[inline]
    pub fn from_keys(keys: Vec<String>) -> Self {
        Self(keys)
    }

    /// Append a key and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Push a key onto the path (mutating).
    #[inline]
    pub fn push_key(&mut self, k: impl Into<String>) {
        self.0.push(k.into());
    }

    /// Pop the last key from the path.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Get the keys of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of keys in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the last key.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the parent path (path without the last key), or `None` for root.
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            let mut p = self.clone();
            p.pop();
            Some(p)
        }
    }

    /// Check if this path starts with another path.
    #[inline]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Iterate over the keys.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for key in &self.0 {
            write!(f, ".{key}")?;
        }
        Ok(())
    }
}

impl FromIterator<String> for Path {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        self.0[index].as_str()
    }
}

/// Construct a `Path` from a sequence of keys.
///
/// # Examples
///
/// ```
/// use nestate::path;
///
/// let p = path!("user", "address", "city");
/// assert_eq!(p.len(), 3);
///
/// let root = path!();
/// assert!(root.is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($key:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push_key($key);
        )+
        p
    }};
}
