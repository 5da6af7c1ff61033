//! Node snapshots and search results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::TreePath;
use crate::value::{AttrMap, AttrValue};

/// Node type tag, carried in the `type` attribute of every served node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    MapNode,
    ListNode,
    Document,
    File,
    Table,
    Link,
    /// Tag not known to this client; preserved verbatim.
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MapNode => "map_node",
            Self::ListNode => "list_node",
            Self::Document => "document",
            Self::File => "file",
            Self::Table => "table",
            Self::Link => "link",
            Self::Other(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "map_node" => Self::MapNode,
            "list_node" => Self::ListNode,
            "document" => Self::Document,
            "file" => Self::File,
            "table" => Self::Table,
            "link" => Self::Link,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one node (and, for map nodes, its subtree) as returned by
/// the service.
///
/// Descendants marked opaque appear with their attributes but without
/// children; only a direct fetch of such a node expands them. The node a
/// fetch was addressed to is always expanded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Attribute bag; always carries `type` for nodes served remotely.
    #[serde(default)]
    pub attributes: AttrMap,
    /// Child nodes, present only for map nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<BTreeMap<String, NodeSnapshot>>,
}

impl NodeSnapshot {
    /// The node's type tag, if the `type` attribute is present and a
    /// string.
    pub fn node_type(&self) -> Option<NodeType> {
        self.attributes
            .get("type")
            .and_then(AttrValue::as_str)
            .map(NodeType::parse)
    }

    /// Whether the node is opaque. Absent or non-boolean means false.
    pub fn opaque(&self) -> bool {
        self.attributes
            .get("opaque")
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// A path matched during search, decorated with the requested attributes.
///
/// Hits are immutable once yielded; the attribute set is exactly what the
/// traversal fetched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: TreePath,
    pub attributes: AttrMap,
}
