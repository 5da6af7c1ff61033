//! Client configuration.
//!
//! Every knob is an explicit value threaded into construction; nothing is
//! read from ambient process state at call time.

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_LIST_SIZE: usize = 1000;

/// Configuration for [`TreeClient`](crate::TreeClient) and
/// [`HttpNamespaceService`](crate::HttpNamespaceService).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the namespace service, e.g. `http://localhost:9180`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Whether `mkdir` creates missing ancestors and tolerates an
    /// existing node.
    pub create_recursive: bool,
    /// Page cap sent with `list` requests.
    pub max_list_size: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            create_recursive: false,
            max_list_size: DEFAULT_MAX_LIST_SIZE,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_create_recursive(mut self, recursive: bool) -> Self {
        self.create_recursive = recursive;
        self
    }

    pub fn with_max_list_size(mut self, max_list_size: usize) -> Self {
        self.max_list_size = max_list_size;
        self
    }
}
