//! Attribute-aware recursive search over the remote tree.
//!
//! The walk is pre-order and strictly sequential: one fetch for the search
//! root, plus one extra fetch per opaque node encountered. Exclusions and
//! the depth bound prune branches before any fetch happens for them.

use crate::error::{GroveError, Result};
use crate::node::{NodeSnapshot, NodeType, SearchHit};
use crate::path::TreePath;
use crate::service::NamespaceService;

/// Subtree that is unconditionally excluded from every search.
pub const SYSTEM_RESERVED_PREFIX: &str = "/sys";

type PathPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type NodePredicate = Box<dyn Fn(&NodeSnapshot) -> bool + Send + Sync>;

/// Filters and bounds for [`search`].
#[derive(Default)]
pub struct SearchOptions {
    node_types: Vec<NodeType>,
    path_filter: Option<PathPredicate>,
    object_filter: Option<NodePredicate>,
    attributes: Vec<String>,
    exclude: Vec<TreePath>,
    depth_bound: Option<usize>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only nodes of the given types. Empty means all types.
    pub fn with_node_types(mut self, node_types: impl IntoIterator<Item = NodeType>) -> Self {
        self.node_types = node_types.into_iter().collect();
        self
    }

    /// Keep only paths accepted by the predicate.
    pub fn with_path_filter(
        mut self,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.path_filter = Some(Box::new(filter));
        self
    }

    /// Keep only nodes accepted by the predicate. The predicate sees the
    /// node's type and fetched attributes.
    pub fn with_object_filter(
        mut self,
        filter: impl Fn(&NodeSnapshot) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.object_filter = Some(Box::new(filter));
        self
    }

    /// Extra attributes to fetch and attach to each hit. `type` and
    /// `opaque` are always requested in addition.
    pub fn with_attributes(
        mut self,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Path prefixes whose subtrees are skipped entirely. The system
    /// subtree is always excluded in addition.
    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = TreePath>) -> Self {
        self.exclude = exclude.into_iter().collect();
        self
    }

    /// Maximum recursion depth; the search root is depth 0.
    pub fn with_depth_bound(mut self, depth_bound: usize) -> Self {
        self.depth_bound = Some(depth_bound);
        self
    }

    fn matches(&self, path: &TreePath, node: &NodeSnapshot, node_type: &NodeType) -> bool {
        (self.node_types.is_empty() || self.node_types.contains(node_type))
            && self.object_filter.as_ref().map_or(true, |filter| filter(node))
            && self
                .path_filter
                .as_ref()
                .map_or(true, |filter| filter(path.as_str()))
    }
}

struct WalkEntry {
    path: TreePath,
    node: NodeSnapshot,
    depth: usize,
    /// Set when the node came straight from a fetch addressed to it, so
    /// its opacity flag must not trigger another fetch.
    force_expanded: bool,
}

/// Recursively enumerates nodes under `root`, returning matches in
/// pre-order (parent before children, children in snapshot key order).
///
/// The root is walked once regardless of its own opacity flag. Every
/// other opaque node costs one dedicated fetch before its children are
/// visited; their children are never taken from the parent's snapshot.
///
/// The first fetch error aborts the whole call; partial results are not
/// returned.
pub async fn search(
    service: &dyn NamespaceService,
    root: &TreePath,
    options: &SearchOptions,
) -> Result<Vec<SearchHit>> {
    // Per-call copies so caller-supplied lists are never aliased or
    // mutated.
    let mut attributes = options.attributes.clone();
    for required in ["type", "opaque"] {
        if !attributes.iter().any(|name| name == required) {
            attributes.push(required.to_string());
        }
    }

    let mut exclude = options.exclude.clone();
    exclude.push(TreePath::parse(SYSTEM_RESERVED_PREFIX)?);

    let root_node = service.get(root, &attributes).await?;

    let mut results = Vec::new();
    let mut stack = vec![WalkEntry {
        path: root.clone(),
        node: root_node,
        depth: 0,
        force_expanded: true,
    }];

    while let Some(entry) = stack.pop() {
        let WalkEntry {
            path,
            node,
            depth,
            force_expanded,
        } = entry;

        // Exclusion and depth pruning come before any fetch or filter
        // evaluation.
        if exclude.iter().any(|prefix| path.starts_with(prefix)) {
            continue;
        }
        if options.depth_bound.is_some_and(|bound| depth > bound) {
            continue;
        }

        // Opaque nodes carry no children in the parent's snapshot; expand
        // them with a dedicated fetch using the same attribute set.
        if node.opaque() && !force_expanded {
            tracing::debug!("expanding opaque node at {path}");
            let expanded = service.get(&path, &attributes).await?;
            stack.push(WalkEntry {
                path,
                node: expanded,
                depth,
                force_expanded: true,
            });
            continue;
        }

        let node_type = node.node_type().ok_or_else(|| {
            GroveError::Protocol(format!("node at {path} has no type attribute"))
        })?;

        let is_match = options.matches(&path, &node, &node_type);
        let NodeSnapshot {
            attributes: node_attributes,
            children,
        } = node;

        if is_match {
            results.push(SearchHit {
                path: path.clone(),
                attributes: node_attributes,
            });
        }

        // A matched container is still descended into.
        if node_type == NodeType::MapNode {
            if let Some(children) = children {
                // Reverse push order so the LIFO pop yields key order.
                for (key, child) in children.into_iter().rev() {
                    stack.push(WalkEntry {
                        path: path.child(&key)?,
                        node: child,
                        depth: depth + 1,
                        force_expanded: false,
                    });
                }
            }
        }
    }

    Ok(results)
}
