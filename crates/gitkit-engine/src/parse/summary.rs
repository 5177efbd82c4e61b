//! Summaries printed by `git commit` and `git merge`

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{lines, unparsable};
use crate::operation::OperationKind;
use crate::Result;

/// `[main (root-commit) 1a2b3c4] subject` or `[detached HEAD 1a2b3c4] subject`
static COMMIT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.+?) (\(root-commit\) )?([0-9a-f]{7,64})\] (.*)$")
        .expect("Invalid commit summary regex")
});

/// ` 2 files changed, 10 insertions(+), 3 deletions(-)`
static STATS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(\d+) files? changed(?:, (\d+) insertions?\(\+\))?(?:, (\d+) deletions?\(-\))?",
    )
    .expect("Invalid diffstat summary regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

fn parse_stats(output: &str) -> Option<ChangeStats> {
    output.lines().find_map(|line| {
        let caps = STATS_LINE.captures(line)?;
        let number = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0)
        };
        Some(ChangeStats {
            files_changed: number(1),
            insertions: number(2),
            deletions: number(3),
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Branch name, or `detached HEAD`
    pub branch: String,
    pub short_hash: String,
    pub subject: String,
    pub root_commit: bool,
    pub stats: Option<ChangeStats>,
}

/// Parse the first line of `git commit` stdout.
pub fn parse_commit(stdout: &str) -> Result<CommitSummary> {
    let op = OperationKind::Commit;
    let first = lines(stdout)
        .next()
        .ok_or_else(|| unparsable(op, "<empty output>"))?;
    let caps = COMMIT_LINE
        .captures(first)
        .ok_or_else(|| unparsable(op, first))?;

    Ok(CommitSummary {
        branch: caps[1].to_string(),
        root_commit: caps.get(2).is_some(),
        short_hash: caps[3].to_string(),
        subject: caps[4].to_string(),
        stats: parse_stats(stdout),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    FastForward,
    /// A merge commit was created
    Merged,
    UpToDate,
    /// Changes staged with `--squash`, no commit created
    Squashed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub outcome: MergeOutcome,
    /// e.g. `ort`, when git names the strategy
    pub strategy: Option<String>,
    pub stats: Option<ChangeStats>,
}

/// Classify a successful `git merge` run.
pub fn parse_merge(stdout: &str, aborted: bool) -> Result<MergeReport> {
    if aborted {
        return Ok(MergeReport {
            outcome: MergeOutcome::Aborted,
            strategy: None,
            stats: None,
        });
    }

    let strategy = stdout.lines().find_map(|l| {
        l.strip_prefix("Merge made by the '")
            .and_then(|rest| rest.split_once('\''))
            .map(|(name, _)| name.to_string())
    });

    let outcome = if stdout.contains("Already up to date") || stdout.contains("Already up-to-date")
    {
        MergeOutcome::UpToDate
    } else if stdout.contains("Squash commit") {
        MergeOutcome::Squashed
    } else if stdout.contains("Fast-forward") {
        MergeOutcome::FastForward
    } else if strategy.is_some() {
        MergeOutcome::Merged
    } else {
        let first = lines(stdout).next().unwrap_or("<empty output>");
        return Err(unparsable(OperationKind::Merge, first));
    };

    Ok(MergeReport {
        outcome,
        strategy,
        stats: parse_stats(stdout),
    })
}
