//! `git stash list`

use serde::{Deserialize, Serialize};

use super::{lines, unparsable};
use crate::operation::OperationKind;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashEntry {
    /// Stack position; `0` is the most recent stash
    pub index: usize,
    /// Branch the stash was taken on, when git recorded one
    pub branch: Option<String>,
    /// Full description, e.g. `WIP on main: 1a2b3c4 subject`
    pub description: String,
}

impl StashEntry {
    /// Selector accepted by `stash pop/apply/drop`.
    pub fn reference(&self) -> String {
        format!("stash@{{{}}}", self.index)
    }
}

/// Parse `stash@{N}: <description>` lines.
///
/// The index is the line's position; git always lists the stack in order.
pub fn parse_stash_list(stdout: &str) -> Result<Vec<StashEntry>> {
    lines(stdout)
        .enumerate()
        .map(|(index, line)| {
            let description = line
                .strip_prefix("stash@{")
                .and_then(|rest| rest.split_once("}: "))
                .map(|(_, description)| description)
                .ok_or_else(|| unparsable(OperationKind::Stash, line))?;

            Ok(StashEntry {
                index,
                branch: stash_branch(description),
                description: description.to_string(),
            })
        })
        .collect()
}

/// `WIP on <branch>: ...` or `On <branch>: ...`
fn stash_branch(description: &str) -> Option<String> {
    let rest = description
        .strip_prefix("WIP on ")
        .or_else(|| description.strip_prefix("On "))?;
    rest.split_once(':').map(|(branch, _)| branch.to_string())
}
