//! Ref updates reported by `git fetch` and `git pull`
//!
//! git writes ref update lines to stderr:
//!
//! ```text
//!  * [new branch]      feature    -> origin/feature
//!  - [deleted]         (none)     -> origin/old
//!    1a2b3c4..5d6e7f8  main       -> origin/main
//!  + 1a2b3c4...9f8e7d6 rewritten  -> origin/rewritten  (forced update)
//!  * branch            main       -> FETCH_HEAD
//! ```
//!
//! Other stderr lines (`From <url>`, `remote:` messages, hints) are ignored.
//! A line that looks like a ref update but does not match is an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::unparsable;
use crate::operation::OperationKind;
use crate::Result;

static REF_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^ (?P<flag>[ *+\-!=t]) (?P<summary>\[[^\]]+\]|[0-9a-f]+\.\.\.?[0-9a-f]+|branch|tag)\s+(?P<from>\S+)\s+->\s+(?P<to>\S+)(?:\s+\((?P<reason>[^)]*)\))?\s*$",
    )
    .expect("Invalid ref update regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefUpdateKind {
    NewBranch,
    NewTag,
    NewRef,
    Deleted,
    FastForward,
    Forced,
    TagUpdate,
    UpToDate,
    Rejected,
    /// Explicitly requested ref written only to `FETCH_HEAD`
    FetchHead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefUpdate {
    pub kind: RefUpdateKind,
    /// Remote side, `(none)` for deletions
    pub from: String,
    /// Local ref that was updated
    pub to: String,
    /// `old..new` or `old...new` for updates of existing refs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub updates: Vec<RefUpdate>,
}

impl FetchReport {
    pub fn new_branches(&self) -> impl Iterator<Item = &str> {
        self.of_kind(RefUpdateKind::NewBranch)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.of_kind(RefUpdateKind::Deleted)
    }

    fn of_kind(&self, kind: RefUpdateKind) -> impl Iterator<Item = &str> {
        self.updates
            .iter()
            .filter(move |u| u.kind == kind)
            .map(|u| u.to.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullReport {
    pub updates: Vec<RefUpdate>,
    pub fast_forward: bool,
    pub already_up_to_date: bool,
    pub conflict: bool,
}

pub fn parse_fetch(stderr: &str) -> Result<FetchReport> {
    Ok(FetchReport {
        updates: parse_updates(OperationKind::Fetch, stderr)?,
    })
}

/// Pull reports its merge outcome on stdout and ref updates on stderr.
pub fn parse_pull(stdout: &str, stderr: &str) -> Result<PullReport> {
    let either = |needle: &str| stdout.contains(needle) || stderr.contains(needle);
    Ok(PullReport {
        updates: parse_updates(OperationKind::Pull, stderr)?,
        fast_forward: either("Fast-forward"),
        already_up_to_date: either("Already up to date") || either("Already up-to-date"),
        conflict: either("CONFLICT"),
    })
}

fn looks_like_update(line: &str) -> bool {
    line.starts_with(' ') && line.contains(" -> ")
}

fn parse_updates(operation: OperationKind, stderr: &str) -> Result<Vec<RefUpdate>> {
    let mut updates = Vec::new();
    for line in stderr.lines().map(|l| l.trim_end_matches('\r')) {
        if !looks_like_update(line) {
            continue;
        }
        let caps = REF_UPDATE
            .captures(line)
            .ok_or_else(|| unparsable(operation, line))?;

        let summary = &caps["summary"];
        let kind = match (&caps["flag"], summary) {
            (_, "[new branch]") => RefUpdateKind::NewBranch,
            (_, "[new tag]") => RefUpdateKind::NewTag,
            (_, "[new ref]") => RefUpdateKind::NewRef,
            (_, "[deleted]") => RefUpdateKind::Deleted,
            (_, "[tag update]") => RefUpdateKind::TagUpdate,
            (_, "[up to date]") => RefUpdateKind::UpToDate,
            (_, "branch" | "tag") => RefUpdateKind::FetchHead,
            ("!", _) => RefUpdateKind::Rejected,
            ("+", _) => RefUpdateKind::Forced,
            (" ", s) if !s.starts_with('[') => RefUpdateKind::FastForward,
            _ => return Err(unparsable(operation, line)),
        };

        updates.push(RefUpdate {
            kind,
            from: caps["from"].to_string(),
            to: caps["to"].to_string(),
            range: summary.contains("..").then(|| summary.to_string()),
            reason: caps.name("reason").map(|m| m.as_str().to_string()),
        });
    }
    Ok(updates)
}
