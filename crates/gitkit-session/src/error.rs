//! Error types for gitkit-session

/// Result type for gitkit-session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitkit-session operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Working directory must not be empty")]
    EmptyPath,

    #[error("Working directory must be an absolute path: {path}")]
    RelativePath { path: String },

    #[error("Working directory contains a path traversal segment: {path}")]
    PathTraversal { path: String },

    #[error("Session key must not be empty")]
    EmptyKey,
}
