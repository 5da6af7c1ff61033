//! Shared in-memory mock of the namespace service.
//!
//! The mock honors the `get` subtree contract: the addressed node is
//! always expanded, opaque descendants are served without children, and
//! only requested attributes (plus `type`) are attached. Every call is
//! recorded so tests can assert on fetch counts and paths.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use grove::{
    AttrMap, AttrValue, CreateOptions, GroveError, LinkOptions, NamespaceService, NodeSnapshot,
    NodeType, RemoveOptions, Result, TreePath,
};

/// One node in the mock tree.
#[derive(Debug, Clone)]
pub struct MockNode {
    pub node_type: NodeType,
    pub opaque: bool,
    pub attributes: AttrMap,
    pub value: Option<AttrValue>,
    pub children: BTreeMap<String, MockNode>,
}

impl MockNode {
    pub fn of_type(node_type: NodeType) -> Self {
        Self {
            node_type,
            opaque: false,
            attributes: AttrMap::new(),
            value: None,
            children: BTreeMap::new(),
        }
    }

    pub fn map() -> Self {
        Self::of_type(NodeType::MapNode)
    }

    pub fn document() -> Self {
        Self::of_type(NodeType::Document)
    }

    pub fn table() -> Self {
        Self::of_type(NodeType::Table)
    }

    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, key: &str, child: MockNode) -> Self {
        self.children.insert(key.to_string(), child);
        self
    }
}

/// A recorded service call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Get(String),
    Exists(String),
    List(String),
    Set(String),
    Create {
        path: String,
        recursive: bool,
        ignore_existing: bool,
    },
    Remove {
        path: String,
        recursive: bool,
    },
    Copy {
        source: String,
        destination: String,
    },
    Move {
        source: String,
        destination: String,
    },
    Link {
        target: String,
        link_path: String,
    },
    SetAttribute {
        path: String,
        name: String,
    },
}

struct State {
    root: MockNode,
    calls: Vec<MockCall>,
    /// Remaining `exists` calls forced to report true, simulating
    /// collisions.
    forced_exists: usize,
    /// Paths whose direct `get` fails with `PermissionDenied`.
    deny_get: Vec<String>,
    /// Paths whose direct `get` fails with `NotFound`, simulating a node
    /// vanishing between snapshot and re-fetch.
    vanish_get: Vec<String>,
}

pub struct MockService {
    state: Mutex<State>,
}

impl MockService {
    pub fn new(root: MockNode) -> Self {
        Self {
            state: Mutex::new(State {
                root,
                calls: Vec::new(),
                forced_exists: 0,
                deny_get: Vec::new(),
                vanish_get: Vec::new(),
            }),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().expect("mock lock").calls.clone()
    }

    pub fn get_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Get(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn list_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::List(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn remove_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Remove { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn exists_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Exists(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Forces the next `count` `exists` calls to report true.
    pub fn force_exists(&self, count: usize) {
        self.state.lock().expect("mock lock").forced_exists = count;
    }

    pub fn deny_get(&self, path: &str) {
        self.state
            .lock()
            .expect("mock lock")
            .deny_get
            .push(path.to_string());
    }

    pub fn vanish_get(&self, path: &str) {
        self.state
            .lock()
            .expect("mock lock")
            .vanish_get
            .push(path.to_string());
    }

    /// Assertion helper: node presence without recording a call.
    pub fn node_exists(&self, path: &str) -> bool {
        let state = self.state.lock().expect("mock lock");
        let path = TreePath::parse(path).expect("valid assertion path");
        find(&state.root, &path).is_some()
    }

    /// Assertion helper: value written by `set`, without recording a call.
    pub fn value_at(&self, path: &str) -> Option<AttrValue> {
        let state = self.state.lock().expect("mock lock");
        let path = TreePath::parse(path).expect("valid assertion path");
        find(&state.root, &path).and_then(|node| node.value.clone())
    }
}

fn find<'a>(root: &'a MockNode, path: &TreePath) -> Option<&'a MockNode> {
    let mut node = root;
    for segment in path.segments() {
        node = node.children.get(segment)?;
    }
    Some(node)
}

fn find_mut<'a>(root: &'a mut MockNode, path: &TreePath) -> Option<&'a mut MockNode> {
    let mut node = root;
    for segment in path.segments() {
        node = node.children.get_mut(segment)?;
    }
    Some(node)
}

/// Builds the served snapshot for `node`.
///
/// `addressed` marks the node the fetch was addressed to; it is expanded
/// even when opaque. Other opaque map nodes lose their children.
fn snapshot_of(node: &MockNode, requested: &[String], addressed: bool) -> NodeSnapshot {
    let mut attributes = AttrMap::new();
    attributes.insert(
        "type".to_string(),
        AttrValue::from(node.node_type.as_str()),
    );
    if requested.iter().any(|name| name == "opaque") {
        attributes.insert("opaque".to_string(), AttrValue::from(node.opaque));
    }
    for name in requested {
        if let Some(value) = node.attributes.get(name) {
            attributes.insert(name.clone(), value.clone());
        }
    }

    let children = if node.node_type == NodeType::MapNode && (addressed || !node.opaque) {
        Some(
            node.children
                .iter()
                .map(|(key, child)| (key.clone(), snapshot_of(child, requested, false)))
                .collect(),
        )
    } else {
        None
    };

    NodeSnapshot {
        attributes,
        children,
    }
}

fn create_at(
    root: &mut MockNode,
    path: &TreePath,
    node_type: NodeType,
    options: &CreateOptions,
) -> Result<()> {
    let segments: Vec<&str> = path.segments().collect();
    let Some((leaf, ancestors)) = segments.split_last() else {
        return Err(GroveError::Protocol("create: cannot create the root".to_string()));
    };

    let mut node = root;
    for segment in ancestors {
        if !node.children.contains_key(*segment) {
            if !options.recursive {
                return Err(GroveError::NotFound(format!(
                    "create: missing ancestor of {path}"
                )));
            }
            node.children.insert(segment.to_string(), MockNode::map());
        }
        node = node.children.get_mut(*segment).expect("just inserted");
    }

    if node.children.contains_key(*leaf) {
        if options.ignore_existing {
            return Ok(());
        }
        return Err(GroveError::Protocol(format!(
            "create: node already exists: {path}"
        )));
    }

    let mut created = MockNode::of_type(node_type);
    created.attributes = options.attributes.clone();
    node.children.insert(leaf.to_string(), created);
    Ok(())
}

fn remove_at(root: &mut MockNode, path: &TreePath, options: &RemoveOptions) -> Result<()> {
    let Some(parent_path) = path.parent() else {
        return Err(GroveError::Protocol("remove: cannot remove the root".to_string()));
    };
    let Some(parent) = find_mut(root, &parent_path) else {
        if options.force {
            return Ok(());
        }
        return Err(GroveError::NotFound(format!("remove: {path}")));
    };
    let has_children = match parent.children.get(path.name()) {
        None if options.force => return Ok(()),
        None => return Err(GroveError::NotFound(format!("remove: {path}"))),
        Some(node) => !node.children.is_empty(),
    };
    if has_children && !options.recursive {
        return Err(GroveError::Protocol(format!(
            "remove: node is not empty: {path}"
        )));
    }
    parent.children.remove(path.name());
    Ok(())
}

fn insert_at(root: &mut MockNode, path: &TreePath, node: MockNode) -> Result<()> {
    let Some(parent_path) = path.parent() else {
        return Err(GroveError::Protocol("cannot replace the root".to_string()));
    };
    let parent = find_mut(root, &parent_path)
        .ok_or_else(|| GroveError::NotFound(format!("missing parent of {path}")))?;
    if parent.children.contains_key(path.name()) {
        return Err(GroveError::Protocol(format!("node already exists: {path}")));
    }
    parent.children.insert(path.name().to_string(), node);
    Ok(())
}

#[async_trait]
impl NamespaceService for MockService {
    async fn get(&self, path: &TreePath, attributes: &[String]) -> Result<NodeSnapshot> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Get(path.to_string()));
        if state.deny_get.iter().any(|denied| denied == path.as_str()) {
            return Err(GroveError::PermissionDenied(format!("get: {path}")));
        }
        if state.vanish_get.iter().any(|gone| gone == path.as_str()) {
            return Err(GroveError::NotFound(format!("get: {path}")));
        }
        let node = find(&state.root, path)
            .ok_or_else(|| GroveError::NotFound(format!("get: {path}")))?;
        Ok(snapshot_of(node, attributes, true))
    }

    async fn exists(&self, path: &TreePath) -> Result<bool> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Exists(path.to_string()));
        if state.forced_exists > 0 {
            state.forced_exists -= 1;
            return Ok(true);
        }
        Ok(find(&state.root, path).is_some())
    }

    async fn list(&self, path: &TreePath) -> Result<Vec<String>> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::List(path.to_string()));
        let node = find(&state.root, path)
            .ok_or_else(|| GroveError::NotFound(format!("list: {path}")))?;
        Ok(node.children.keys().cloned().collect())
    }

    async fn set(&self, path: &TreePath, value: AttrValue) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Set(path.to_string()));
        let node = find_mut(&mut state.root, path)
            .ok_or_else(|| GroveError::NotFound(format!("set: {path}")))?;
        node.value = Some(value);
        Ok(())
    }

    async fn create(
        &self,
        node_type: NodeType,
        path: &TreePath,
        options: &CreateOptions,
    ) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Create {
            path: path.to_string(),
            recursive: options.recursive,
            ignore_existing: options.ignore_existing,
        });
        create_at(&mut state.root, path, node_type, options)
    }

    async fn remove(&self, path: &TreePath, options: &RemoveOptions) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Remove {
            path: path.to_string(),
            recursive: options.recursive,
        });
        remove_at(&mut state.root, path, options)
    }

    async fn copy(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Copy {
            source: source.to_string(),
            destination: destination.to_string(),
        });
        let node = find(&state.root, source)
            .ok_or_else(|| GroveError::NotFound(format!("copy: {source}")))?
            .clone();
        insert_at(&mut state.root, destination, node)
    }

    async fn move_node(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Move {
            source: source.to_string(),
            destination: destination.to_string(),
        });
        let node = find(&state.root, source)
            .ok_or_else(|| GroveError::NotFound(format!("move: {source}")))?
            .clone();
        insert_at(&mut state.root, destination, node)?;
        remove_at(
            &mut state.root,
            source,
            &RemoveOptions {
                recursive: true,
                force: false,
            },
        )
    }

    async fn link(
        &self,
        target: &TreePath,
        link_path: &TreePath,
        options: &LinkOptions,
    ) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::Link {
            target: target.to_string(),
            link_path: link_path.to_string(),
        });
        let create_options = CreateOptions {
            recursive: options.recursive,
            ignore_existing: options.ignore_existing,
            attributes: AttrMap::from([(
                "target_path".to_string(),
                AttrValue::from(target.as_str()),
            )]),
        };
        create_at(
            &mut state.root,
            link_path,
            NodeType::Link,
            &create_options,
        )
    }

    async fn set_attribute(&self, path: &TreePath, name: &str, value: AttrValue) -> Result<()> {
        let mut state = self.state.lock().expect("mock lock");
        state.calls.push(MockCall::SetAttribute {
            path: path.to_string(),
            name: name.to_string(),
        });
        let node = find_mut(&mut state.root, path)
            .ok_or_else(|| GroveError::NotFound(format!("set_attribute: {path}")))?;
        node.attributes.insert(name.to_string(), value);
        Ok(())
    }
}
