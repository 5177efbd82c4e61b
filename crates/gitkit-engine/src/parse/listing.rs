//! Branch, worktree, tag and remote listings

use serde::{Deserialize, Serialize};

use super::{lines, unparsable};
use crate::operation::OperationKind;
use crate::Result;

/// `git branch --list --format=<BRANCH_FORMAT>`: tab separated
/// `HEAD marker, full refname, object id, upstream`.
pub const BRANCH_FORMAT: &str = "%(HEAD)%09%(refname)%09%(objectname)%09%(upstream:short)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    /// Short name, e.g. `main` or `origin/main`
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
    pub commit: String,
    pub upstream: Option<String>,
}

pub fn parse_branches(stdout: &str) -> Result<Vec<BranchInfo>> {
    let op = OperationKind::Branch;
    let mut branches = Vec::new();

    for line in lines(stdout) {
        let fields: Vec<&str> = line.split('\t').collect();
        let [head, refname, commit, upstream] = fields[..] else {
            return Err(unparsable(op, line));
        };

        let (name, is_remote) = if let Some(name) = refname.strip_prefix("refs/heads/") {
            (name, false)
        } else if let Some(name) = refname.strip_prefix("refs/remotes/") {
            (name, true)
        } else if refname == "HEAD" || refname.starts_with('(') {
            // detached HEAD pseudo-entry
            continue;
        } else {
            return Err(unparsable(op, line));
        };

        branches.push(BranchInfo {
            name: name.to_string(),
            is_current: head == "*",
            is_remote,
            commit: commit.to_string(),
            upstream: (!upstream.is_empty()).then(|| upstream.to_string()),
        });
    }
    Ok(branches)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeInfo {
    pub path: String,
    pub head: Option<String>,
    /// Short branch name; `None` when detached or bare
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: bool,
    pub prunable: bool,
}

/// `git worktree list --porcelain`: blank-line separated blocks, each
/// starting with `worktree <path>`. Unknown attributes are ignored.
pub fn parse_worktrees(stdout: &str) -> Result<Vec<WorktreeInfo>> {
    let op = OperationKind::Worktree;
    let mut worktrees: Vec<WorktreeInfo> = Vec::new();

    for line in lines(stdout) {
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        if key == "worktree" {
            worktrees.push(WorktreeInfo {
                path: value.to_string(),
                ..Default::default()
            });
            continue;
        }

        let current = worktrees.last_mut().ok_or_else(|| unparsable(op, line))?;
        match key {
            "HEAD" => current.head = Some(value.to_string()),
            "branch" => {
                current.branch =
                    Some(value.strip_prefix("refs/heads/").unwrap_or(value).to_string());
            }
            "bare" => current.bare = true,
            "detached" => current.detached = true,
            "locked" => current.locked = true,
            "prunable" => current.prunable = true,
            _ => {}
        }
    }
    Ok(worktrees)
}

/// `git tag --list`: one name per line.
pub fn parse_tags(stdout: &str) -> Vec<String> {
    lines(stdout).map(|l| l.trim().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInfo {
    pub name: String,
    pub fetch_url: Option<String>,
    pub push_url: Option<String>,
}

/// `git remote -v`: `<name>\t<url> (fetch|push)`.
pub fn parse_remotes(stdout: &str) -> Result<Vec<RemoteInfo>> {
    let op = OperationKind::Remote;
    let mut remotes: Vec<RemoteInfo> = Vec::new();

    for line in lines(stdout) {
        let (name, rest) = line.split_once('\t').ok_or_else(|| unparsable(op, line))?;
        let (url, direction) = rest
            .rsplit_once(' ')
            .ok_or_else(|| unparsable(op, line))?;

        let index = match remotes.iter().position(|r| r.name == name) {
            Some(index) => index,
            None => {
                remotes.push(RemoteInfo {
                    name: name.to_string(),
                    fetch_url: None,
                    push_url: None,
                });
                remotes.len() - 1
            }
        };
        let remote = &mut remotes[index];
        match direction {
            "(fetch)" => remote.fetch_url = Some(url.to_string()),
            "(push)" => remote.push_url = Some(url.to_string()),
            _ => return Err(unparsable(op, line)),
        }
    }
    Ok(remotes)
}
