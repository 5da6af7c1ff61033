//! Client library for a remote hierarchical namespace service.
//!
//! This crate provides:
//! - Validated tree paths and typed node attribute values
//! - An async service boundary with a JSON-over-HTTP implementation
//! - Attribute-aware recursive search over the remote tree
//! - Tree maintenance helpers (mkdir, free-path probing, empty-dir sweep)

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod node;
pub mod path;
pub mod search;
pub mod service;
pub mod value;

// Re-export main types
pub use client::TreeClient;
pub use config::ClientConfig;
pub use error::{GroveError, Result};
pub use http::HttpNamespaceService;
pub use node::{NodeSnapshot, NodeType, SearchHit};
pub use path::TreePath;
pub use search::{search, SearchOptions};
pub use service::{CreateOptions, LinkOptions, NamespaceService, RemoveOptions};
pub use value::{AttrMap, AttrValue};
