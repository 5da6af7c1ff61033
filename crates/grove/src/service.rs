//! The remote namespace service boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::node::{NodeSnapshot, NodeType};
use crate::path::TreePath;
use crate::value::{AttrMap, AttrValue};

/// Options for [`NamespaceService::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Create missing intermediate map nodes.
    pub recursive: bool,
    /// Succeed without error if the node already exists.
    pub ignore_existing: bool,
    /// Attributes to set on the new node.
    pub attributes: AttrMap,
}

/// Options for [`NamespaceService::remove`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Remove non-empty containers together with their subtree.
    pub recursive: bool,
    /// Succeed without error if the node does not exist.
    pub force: bool,
}

/// Options for [`NamespaceService::link`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkOptions {
    pub recursive: bool,
    pub ignore_existing: bool,
}

/// Async boundary to the remote tree service.
///
/// Implementations own transport and authentication. None of the
/// operations retry; retry and backoff policy belongs to callers.
#[async_trait]
pub trait NamespaceService: Send + Sync {
    /// Fetches the subtree snapshot rooted at `path`.
    ///
    /// Only the named attributes (plus `type`) are attached to each node
    /// in the response. Opaque descendants are served without children;
    /// the node the fetch is addressed to is always expanded, opaque or
    /// not.
    async fn get(&self, path: &TreePath, attributes: &[String]) -> Result<NodeSnapshot>;

    /// Whether `path` exists. Missing paths are `Ok(false)`, never
    /// `NotFound`.
    async fn exists(&self, path: &TreePath) -> Result<bool>;

    /// Child keys of a container node, in service order. The order is
    /// implementation-defined but stable within one response.
    async fn list(&self, path: &TreePath) -> Result<Vec<String>>;

    /// Writes the value stored at `path`.
    async fn set(&self, path: &TreePath, value: AttrValue) -> Result<()>;

    /// Creates a node of the given type at `path`.
    async fn create(
        &self,
        node_type: NodeType,
        path: &TreePath,
        options: &CreateOptions,
    ) -> Result<()>;

    /// Removes the node at `path`.
    async fn remove(&self, path: &TreePath, options: &RemoveOptions) -> Result<()>;

    async fn copy(&self, source: &TreePath, destination: &TreePath) -> Result<()>;

    async fn move_node(&self, source: &TreePath, destination: &TreePath) -> Result<()>;

    /// Creates a link node at `link_path` pointing to `target`.
    async fn link(
        &self,
        target: &TreePath,
        link_path: &TreePath,
        options: &LinkOptions,
    ) -> Result<()>;

    /// Writes a single attribute on an existing node.
    async fn set_attribute(&self, path: &TreePath, name: &str, value: AttrValue) -> Result<()>;
}
