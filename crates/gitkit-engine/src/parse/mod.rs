//! Parsers for git's text output
//!
//! All parsers assume git 2.30 or newer running with `LC_ALL=C`. Each one
//! documents the exact invocation it expects. A line that does not have the
//! expected shape yields [`Error::UnparsableOutput`] rather than being
//! skipped, so format drift between git versions shows up as an error.

mod clean;
mod diff;
mod fetch;
mod listing;
mod log;
mod reflog;
mod stash;
mod status;
mod summary;

pub use clean::{CleanReport, parse_clean};
pub use diff::{DiffStatEntry, parse_numstat};
pub use fetch::{FetchReport, PullReport, RefUpdate, RefUpdateKind, parse_fetch, parse_pull};
pub use listing::{
    BRANCH_FORMAT, BranchInfo, RemoteInfo, WorktreeInfo, parse_branches, parse_remotes,
    parse_tags, parse_worktrees,
};
pub use log::{CommitInfo, LOG_FORMAT, parse_log};
pub use reflog::{ReflogEntry, parse_reflog};
pub use stash::{StashEntry, parse_stash_list};
pub use status::{RenamedPath, StatusReport, parse_status};
pub use summary::{
    ChangeStats, CommitSummary, MergeOutcome, MergeReport, parse_commit, parse_merge,
};

use crate::operation::OperationKind;
use crate::Error;

pub(crate) fn unparsable(operation: OperationKind, line: &str) -> Error {
    Error::UnparsableOutput {
        operation: operation.name().to_string(),
        line: line.to_string(),
    }
}

/// Non-empty lines with trailing `\r` removed.
pub(crate) fn lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
}

/// Decode a path that git may have C-quoted (`core.quotePath`).
///
/// Unquoted input is returned unchanged. Returns `None` for a quoted string
/// with a malformed escape.
pub fn unquote_path(raw: &str) -> Option<String> {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Some(raw.to_string());
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            'a' => bytes.push(0x07),
            'b' => bytes.push(0x08),
            'f' => bytes.push(0x0c),
            'n' => bytes.push(b'\n'),
            'r' => bytes.push(b'\r'),
            't' => bytes.push(b'\t'),
            'v' => bytes.push(0x0b),
            '"' => bytes.push(b'"'),
            '\\' => bytes.push(b'\\'),
            d @ '0'..='3' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                bytes.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
