//! Slash-separated tree paths.
//!
//! Paths identify nodes in the remote namespace: `/` is the root, every
//! other path is `/`-joined segments with no trailing slash and no empty
//! segments. Paths are case-sensitive.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GroveError, Result};

/// A validated, canonical path into the remote namespace tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath(String);

impl TreePath {
    /// The namespace root, `/`.
    pub fn root() -> Self {
        TreePath("/".to_string())
    }

    /// Parses and validates a path string.
    pub fn parse(input: &str) -> Result<Self> {
        if input == "/" {
            return Ok(Self::root());
        }
        if input.is_empty() {
            return Err(GroveError::InvalidPath("empty path".to_string()));
        }
        if !input.starts_with('/') {
            return Err(GroveError::InvalidPath(format!(
                "path must start with '/': {input}"
            )));
        }
        if input.ends_with('/') {
            return Err(GroveError::InvalidPath(format!(
                "trailing slash in path: {input}"
            )));
        }
        for segment in input[1..].split('/') {
            if segment.is_empty() {
                return Err(GroveError::InvalidPath(format!(
                    "empty segment in path: {input}"
                )));
            }
        }
        Ok(TreePath(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The path's segments, in order. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Number of segments below the root; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment. Empty for the root.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// The containing path, or `None` for the root.
    pub fn parent(&self) -> Option<TreePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(TreePath::root()),
            Some(idx) => Some(TreePath(self.0[..idx].to_string())),
        }
    }

    /// Appends a child key, validating it as a single segment.
    pub fn child(&self, key: &str) -> Result<TreePath> {
        if key.is_empty() {
            return Err(GroveError::InvalidPath(format!(
                "empty child key under {self}"
            )));
        }
        if key.contains('/') {
            return Err(GroveError::InvalidPath(format!(
                "child key may not contain '/': {key}"
            )));
        }
        if self.is_root() {
            Ok(TreePath(format!("/{key}")))
        } else {
            Ok(TreePath(format!("{}/{key}", self.0)))
        }
    }

    /// Segment-aware prefix test: `/a/x` is under `/a`, but `/ab` is not.
    pub fn starts_with(&self, prefix: &TreePath) -> bool {
        if prefix.is_root() {
            return true;
        }
        if self.0 == prefix.0 {
            return true;
        }
        self.0.starts_with(prefix.0.as_str()) && self.0.as_bytes()[prefix.0.len()] == b'/'
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TreePath {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TreePath::parse(&raw).map_err(serde::de::Error::custom)
    }
}
