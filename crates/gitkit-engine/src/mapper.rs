//! Classification of failed git runs
//!
//! Spawn failures never reach this module; the runner reports them as
//! [`Error::SpawnFailed`]. Everything else is matched against stderr in a
//! fixed order, first match wins. Signing failures are recognised before any
//! of the not-found, conflict or already-exists markers, since signer
//! wrappers print arbitrary text of their own.

use std::sync::LazyLock;

use regex::Regex;

use crate::exec::{ProcessResult, ProcessSpec};
use crate::operation::OperationKind;
use crate::Error;

/// Marker git prints when the signing program fails.
pub const SIGNING_FAILURE_MARKER: &str = "gpg failed to sign";

const LOCK_MARKERS: &[&str] = &["index.lock", ".lock': File exists"];

const NOT_A_REPOSITORY_MARKER: &str = "not a git repository";

const NOT_FOUND_MARKERS: &[&str] = &[
    "unknown revision",
    "did not match any file(s) known to git",
    "does not have any commits yet",
    "not a valid object name",
    "couldn't find remote ref",
    "invalid reference:",
    "No stash entries found",
    "No such remote",
];

/// git's own "... not found" phrasings, anchored to its message prefixes.
static NOT_FOUND_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:error|fatal|remote|ERROR): (?:(?:branch|tag) '[^']*' not found|Remote branch \S+ not found|remote ref \S+ not found|Repository not found)",
    )
    .expect("valid not-found regex")
});

const CONFLICT_MARKERS: &[&str] = &[
    "CONFLICT",
    "Automatic merge failed",
    "You have not concluded your merge",
    "you need to resolve your current index first",
];

const ALREADY_EXISTS_MARKER: &str = "already exists";

/// Map a run that did not succeed to an engine error.
pub fn map_failure(operation: OperationKind, spec: &ProcessSpec, result: &ProcessResult) -> Error {
    let name = operation.name().to_string();
    let stderr = result.stderr.trim();

    if result.timed_out {
        return Error::Timeout {
            operation: name,
            timeout_ms: u64::try_from(spec.timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    if result.truncated {
        return Error::OutputLimitExceeded {
            operation: name,
            limit_bytes: spec.max_buffer_bytes,
        };
    }

    if LOCK_MARKERS.iter().any(|m| stderr.contains(m)) {
        return Error::LockContention {
            operation: name,
            stderr: stderr.to_string(),
        };
    }

    if stderr.contains(NOT_A_REPOSITORY_MARKER) {
        return Error::NotARepository {
            path: spec.cwd.clone(),
            stderr: stderr.to_string(),
        };
    }

    if stderr.contains(SIGNING_FAILURE_MARKER) {
        return Error::SigningFailed {
            operation: name,
            stderr: stderr.to_string(),
        };
    }

    if NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m)) || NOT_FOUND_LINE.is_match(stderr) {
        return Error::RefNotFound {
            operation: name,
            stderr: stderr.to_string(),
        };
    }

    let either = |marker: &str| stderr.contains(marker) || result.stdout.contains(marker);
    if CONFLICT_MARKERS.iter().any(|m| either(m)) {
        return Error::MergeConflict {
            operation: name,
            detail: conflict_detail(result),
        };
    }

    if stderr.contains(ALREADY_EXISTS_MARKER) {
        return Error::AlreadyExists {
            operation: name,
            stderr: stderr.to_string(),
        };
    }

    let diagnostic = if stderr.is_empty() {
        result.stdout.trim()
    } else {
        stderr
    };
    Error::CommandFailed {
        operation: name,
        exit_code: result.exit_code,
        stderr: diagnostic.to_string(),
    }
}

/// `CONFLICT` lines from both streams, or the raw stderr when there are none.
fn conflict_detail(result: &ProcessResult) -> String {
    let lines: Vec<&str> = result
        .stdout
        .lines()
        .chain(result.stderr.lines())
        .filter(|l| l.contains("CONFLICT"))
        .collect();
    if lines.is_empty() {
        result.stderr.trim().to_string()
    } else {
        lines.join("\n")
    }
}
