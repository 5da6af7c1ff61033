//! High-level tree commands over a namespace service.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::ClientConfig;
use crate::error::{GroveError, Result};
use crate::node::{NodeSnapshot, NodeType, SearchHit};
use crate::path::TreePath;
use crate::search::{search, SearchOptions};
use crate::service::{CreateOptions, LinkOptions, NamespaceService, RemoveOptions};
use crate::value::AttrValue;

/// Length of the random suffix probed by [`TreeClient::find_free_subpath`].
const FREE_SUBPATH_SUFFIX_LEN: usize = 10;

/// Client facade over a [`NamespaceService`].
///
/// Holds only the service handle and configuration, so cloning is cheap
/// and independent calls share no mutable state.
#[derive(Clone)]
pub struct TreeClient {
    service: Arc<dyn NamespaceService>,
    config: ClientConfig,
}

impl TreeClient {
    pub fn new(service: Arc<dyn NamespaceService>, config: ClientConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Service pass-throughs
    // -----------------------------------------------------------------

    /// Fetches the subtree snapshot at `path` with no extra attributes.
    pub async fn get(&self, path: &TreePath) -> Result<NodeSnapshot> {
        self.service.get(path, &[]).await
    }

    /// Fetches the subtree snapshot at `path`, attaching the named
    /// attributes to every node.
    pub async fn get_with_attributes(
        &self,
        path: &TreePath,
        attributes: &[String],
    ) -> Result<NodeSnapshot> {
        self.service.get(path, attributes).await
    }

    pub async fn set(&self, path: &TreePath, value: AttrValue) -> Result<()> {
        self.service.set(path, value).await
    }

    pub async fn exists(&self, path: &TreePath) -> Result<bool> {
        self.service.exists(path).await
    }

    pub async fn list(&self, path: &TreePath) -> Result<Vec<String>> {
        self.service.list(path).await
    }

    pub async fn create(
        &self,
        node_type: NodeType,
        path: &TreePath,
        options: &CreateOptions,
    ) -> Result<()> {
        self.service.create(node_type, path, options).await
    }

    pub async fn remove(&self, path: &TreePath, options: &RemoveOptions) -> Result<()> {
        self.service.remove(path, options).await
    }

    pub async fn copy(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        self.service.copy(source, destination).await
    }

    pub async fn move_node(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        self.service.move_node(source, destination).await
    }

    pub async fn link(
        &self,
        target: &TreePath,
        link_path: &TreePath,
        options: &LinkOptions,
    ) -> Result<()> {
        self.service.link(target, link_path, options).await
    }

    // -----------------------------------------------------------------
    // Directories and attributes
    // -----------------------------------------------------------------

    /// Creates a map node at `path`.
    ///
    /// Whether missing ancestors are created (and an existing node is
    /// tolerated) follows [`ClientConfig::create_recursive`].
    pub async fn mkdir(&self, path: &TreePath) -> Result<()> {
        let recursive = self.config.create_recursive;
        let options = CreateOptions {
            recursive,
            ignore_existing: recursive,
            ..CreateOptions::default()
        };
        self.service.create(NodeType::MapNode, path, &options).await
    }

    /// Reads one attribute of the node at `path`. `None` if the node has
    /// no such attribute.
    pub async fn get_attribute(&self, path: &TreePath, name: &str) -> Result<Option<AttrValue>> {
        let node = self.service.get(path, &[name.to_string()]).await?;
        Ok(node.attributes.get(name).cloned())
    }

    /// Like [`get_attribute`](Self::get_attribute), falling back to
    /// `default` when the attribute is absent.
    pub async fn get_attribute_or(
        &self,
        path: &TreePath,
        name: &str,
        default: AttrValue,
    ) -> Result<AttrValue> {
        Ok(self.get_attribute(path, name).await?.unwrap_or(default))
    }

    pub async fn has_attribute(&self, path: &TreePath, name: &str) -> Result<bool> {
        Ok(self.get_attribute(path, name).await?.is_some())
    }

    pub async fn set_attribute(
        &self,
        path: &TreePath,
        name: &str,
        value: AttrValue,
    ) -> Result<()> {
        self.service.set_attribute(path, name, value).await
    }

    /// Reads the node's type tag.
    pub async fn node_type_of(&self, path: &TreePath) -> Result<NodeType> {
        let node = self.service.get(path, &[]).await?;
        node.node_type().ok_or_else(|| {
            GroveError::Protocol(format!("node at {path} has no type attribute"))
        })
    }

    // -----------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------

    /// Recursive filtered search under `root`; see [`search`].
    pub async fn search(&self, root: &TreePath, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        search(self.service.as_ref(), root, options).await
    }

    // -----------------------------------------------------------------
    // Maintenance helpers
    // -----------------------------------------------------------------

    /// Probes `{prefix}{suffix}` with fresh 10-character alphanumeric
    /// suffixes until an unused path is found.
    ///
    /// Retries are unbounded and unpaced. The existence check is not
    /// atomic with any later create: a concurrent caller can claim the
    /// returned path first, so creation must still handle an
    /// already-existing node.
    pub async fn find_free_subpath(&self, prefix: &str) -> Result<TreePath> {
        loop {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(FREE_SUBPATH_SUFFIX_LEN)
                .map(char::from)
                .collect();
            let candidate = TreePath::parse(&format!("{prefix}{suffix}"))?;
            if !self.service.exists(&candidate).await? {
                return Ok(candidate);
            }
        }
    }

    /// Removes `path` recursively, then sweeps upward removing each
    /// ancestor left with zero children. Stops at the first non-empty
    /// ancestor; the root itself is never removed.
    pub async fn remove_with_empty_dirs(&self, path: &TreePath) -> Result<()> {
        let options = RemoveOptions {
            recursive: true,
            force: false,
        };
        self.service.remove(path, &options).await?;

        let mut current = path.clone();
        while let Some(parent) = current.parent() {
            if parent.is_root() || !self.service.list(&parent).await?.is_empty() {
                break;
            }
            tracing::debug!("removing emptied ancestor {parent}");
            self.service.remove(&parent, &options).await?;
            current = parent;
        }
        Ok(())
    }
}
