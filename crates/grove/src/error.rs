/// Unified error type for namespace service operations.
///
/// Failures from the remote service keep their category so callers can
/// decide on retries; the client itself never retries (see
/// [`Transient`](GroveError::Transient)).
#[derive(Debug, thiserror::Error)]
pub enum GroveError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("transient service error: {0}")]
    Transient(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, GroveError>;
