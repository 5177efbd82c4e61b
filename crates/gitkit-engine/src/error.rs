//! Error types for gitkit-engine
//!
//! Every failure the engine can produce maps to one [`ErrorCategory`] and a
//! stable machine-readable code. Callers format an [`ErrorRecord`] for their
//! own transport; the engine never swallows a failure.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Result type for gitkit-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Bad input, caught before any process is spawned
    Validation,
    /// Repository, ref or path absent
    NotFound,
    /// Lock contention, merge conflicts, exhausted signing retry
    Conflict,
    /// A resource bound was exceeded
    Timeout,
    /// Spawn failure, unparsable output, anything unexpected
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in gitkit-engine operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid options for {operation}: {message}")]
    InvalidOptions { operation: String, message: String },

    #[error("Argument rejected: {argument:?} contains shell metacharacter '{character}'")]
    UnsafeArgument { argument: String, character: char },

    #[error("Flag not allowed: {flag}")]
    DisallowedFlag { flag: String },

    #[error("Value must not start with '-': {value:?}")]
    OptionInjection { value: String },

    #[error("Path traversal rejected: {path}")]
    PathTraversal { path: String },

    #[error("Invalid working directory: {0}")]
    Session(#[from] gitkit_session::Error),

    #[error("No working directory given and none set for session '{session}'")]
    MissingWorkingDirectory { session: String },

    #[error("Working directory not found: {path}")]
    WorkingDirectoryNotFound { path: PathBuf },

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf, stderr: String },

    #[error("{operation}: reference or path not found: {stderr}")]
    RefNotFound { operation: String, stderr: String },

    #[error("{operation}: repository is locked by another git process: {stderr}")]
    LockContention { operation: String, stderr: String },

    #[error("{operation}: conflicts must be resolved: {detail}")]
    MergeConflict { operation: String, detail: String },

    #[error("{operation}: {stderr}")]
    AlreadyExists { operation: String, stderr: String },

    #[error("{operation}: commit signing failed: {stderr}")]
    SigningFailed { operation: String, stderr: String },

    #[error("{operation}: unsigned retry after signing failure also failed: {source}")]
    SigningRetryExhausted {
        operation: String,
        signed_stderr: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{operation}: timed out after {timeout_ms} ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{operation}: output exceeded {limit_bytes} bytes")]
    OutputLimitExceeded {
        operation: String,
        limit_bytes: usize,
    },

    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation}: unparsable output line: {line:?}")]
    UnparsableOutput { operation: String, line: String },

    #[error("{operation}: parser produced {kind} output")]
    UnexpectedOutput { operation: String, kind: String },

    #[error("{operation} failed (exit code {}): {stderr}", display_exit_code(.exit_code))]
    CommandFailed {
        operation: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_exit_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownOperation(_)
            | Error::InvalidOptions { .. }
            | Error::UnsafeArgument { .. }
            | Error::DisallowedFlag { .. }
            | Error::OptionInjection { .. }
            | Error::PathTraversal { .. }
            | Error::Session(_)
            | Error::MissingWorkingDirectory { .. } => ErrorCategory::Validation,

            Error::WorkingDirectoryNotFound { .. }
            | Error::NotARepository { .. }
            | Error::RefNotFound { .. } => ErrorCategory::NotFound,

            Error::LockContention { .. }
            | Error::MergeConflict { .. }
            | Error::AlreadyExists { .. }
            | Error::SigningFailed { .. }
            | Error::SigningRetryExhausted { .. } => ErrorCategory::Conflict,

            Error::Timeout { .. } | Error::OutputLimitExceeded { .. } => ErrorCategory::Timeout,

            Error::SpawnFailed { .. }
            | Error::UnparsableOutput { .. }
            | Error::UnexpectedOutput { .. }
            | Error::CommandFailed { .. }
            | Error::ConfigRead { .. }
            | Error::ConfigParse { .. }
            | Error::InvalidConfig { .. }
            | Error::Io(_) => ErrorCategory::Internal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownOperation(_) => "unknown_operation",
            Error::InvalidOptions { .. } => "invalid_options",
            Error::UnsafeArgument { .. } => "unsafe_argument",
            Error::DisallowedFlag { .. } => "disallowed_flag",
            Error::OptionInjection { .. } => "option_injection",
            Error::PathTraversal { .. } => "path_traversal",
            Error::Session(_) => "invalid_working_directory",
            Error::MissingWorkingDirectory { .. } => "missing_working_directory",
            Error::WorkingDirectoryNotFound { .. } => "working_directory_not_found",
            Error::NotARepository { .. } => "not_a_repository",
            Error::RefNotFound { .. } => "ref_not_found",
            Error::LockContention { .. } => "lock_contention",
            Error::MergeConflict { .. } => "merge_conflict",
            Error::AlreadyExists { .. } => "already_exists",
            Error::SigningFailed { .. } => "signing_failed",
            Error::SigningRetryExhausted { .. } => "signing_retry_exhausted",
            Error::Timeout { .. } => "timeout",
            Error::OutputLimitExceeded { .. } => "output_limit_exceeded",
            Error::SpawnFailed { .. } => "spawn_failed",
            Error::UnparsableOutput { .. } => "unparsable_output",
            Error::UnexpectedOutput { .. } => "unexpected_output",
            Error::CommandFailed { .. } => "command_failed",
            Error::ConfigRead { .. } => "config_read",
            Error::ConfigParse { .. } => "config_parse",
            Error::InvalidConfig { .. } => "invalid_config",
            Error::Io(_) => "io",
        }
    }

    /// Whether the caller may reasonably retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockContention { .. } | Error::Timeout { .. })
    }

    /// Diagnostic payload carrying the original cause, if any.
    fn cause(&self) -> Option<Value> {
        match self {
            Error::NotARepository { path, stderr } => {
                Some(json!({ "path": path, "stderr": stderr }))
            }
            Error::RefNotFound { stderr, .. }
            | Error::LockContention { stderr, .. }
            | Error::AlreadyExists { stderr, .. }
            | Error::SigningFailed { stderr, .. } => Some(json!({ "stderr": stderr })),
            Error::MergeConflict { detail, .. } => Some(json!({ "output": detail })),
            Error::SigningRetryExhausted {
                signed_stderr,
                source,
                ..
            } => Some(json!({
                "signed_stderr": signed_stderr,
                "retry_error": source.to_record(),
            })),
            Error::CommandFailed {
                exit_code, stderr, ..
            } => Some(json!({ "exit_code": exit_code, "stderr": stderr })),
            Error::SpawnFailed { source, .. }
            | Error::ConfigRead { source, .. }
            | Error::Io(source) => Some(json!({
                "io_kind": format!("{:?}", source.kind()),
                "detail": source.to_string(),
            })),
            Error::UnparsableOutput { line, .. } => Some(json!({ "line": line })),
            _ => None,
        }
    }

    /// Convert into the transport-neutral record handed to callers.
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            category: self.category(),
            code: self.code().to_string(),
            message: self.to_string(),
            cause: self.cause(),
        }
    }
}

/// Serializable description of a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Value>,
}

impl From<&Error> for ErrorRecord {
    fn from(error: &Error) -> Self {
        error.to_record()
    }
}
