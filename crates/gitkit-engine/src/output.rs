//! Typed results of successful operations

use serde::{Deserialize, Serialize};

use crate::exec::ProcessResult;
use crate::operation::{
    BranchOptions, GitOperation, RemoteOptions, StashOptions, TagOptions, WorktreeOptions,
};
use crate::parse::{
    self, BranchInfo, CleanReport, CommitInfo, CommitSummary, DiffStatEntry, FetchReport,
    MergeReport, PullReport, ReflogEntry, RemoteInfo, StashEntry, StatusReport, WorktreeInfo,
};
use crate::Result;

/// Raw streams of an operation without a structured parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum OperationOutput {
    Status(StatusReport),
    Log(Vec<CommitInfo>),
    Reflog(Vec<ReflogEntry>),
    StashList(Vec<StashEntry>),
    Fetch(FetchReport),
    Pull(PullReport),
    Clean(CleanReport),
    Branches(Vec<BranchInfo>),
    Worktrees(Vec<WorktreeInfo>),
    Tags(Vec<String>),
    Remotes(Vec<RemoteInfo>),
    DiffStat(Vec<DiffStatEntry>),
    Commit(CommitSummary),
    Merge(MergeReport),
    Text(TextOutput),
}

impl OperationOutput {
    /// Parse the output of a successful run of `operation`.
    pub fn parse(operation: &GitOperation, result: &ProcessResult) -> Result<Self> {
        let stdout = result.stdout.as_str();
        let stderr = result.stderr.as_str();

        let output = match operation {
            GitOperation::Status(_) => Self::Status(parse::parse_status(stdout)?),
            GitOperation::Log(_) => Self::Log(parse::parse_log(stdout)?),
            GitOperation::Diff(opts) if opts.stat => Self::DiffStat(parse::parse_numstat(stdout)?),
            GitOperation::Commit(_) => Self::Commit(parse::parse_commit(stdout)?),
            GitOperation::Merge(opts) => Self::Merge(parse::parse_merge(stdout, opts.abort)?),
            GitOperation::Reflog(_) => Self::Reflog(parse::parse_reflog(stdout)?),
            GitOperation::Fetch(_) => Self::Fetch(parse::parse_fetch(stderr)?),
            GitOperation::Pull(_) => Self::Pull(parse::parse_pull(stdout, stderr)?),
            GitOperation::Clean(opts) => Self::Clean(parse::parse_clean(stdout, opts.dry_run)?),
            GitOperation::Branch(BranchOptions::List { .. }) => {
                Self::Branches(parse::parse_branches(stdout)?)
            }
            GitOperation::Stash(StashOptions::List {}) => {
                Self::StashList(parse::parse_stash_list(stdout)?)
            }
            GitOperation::Worktree(WorktreeOptions::List {}) => {
                Self::Worktrees(parse::parse_worktrees(stdout)?)
            }
            GitOperation::Tag(TagOptions::List { .. }) => Self::Tags(parse::parse_tags(stdout)),
            GitOperation::Remote(RemoteOptions::List {}) => {
                Self::Remotes(parse::parse_remotes(stdout)?)
            }
            _ => Self::Text(TextOutput {
                stdout: result.stdout.clone(),
                stderr: result.stderr.clone(),
            }),
        };
        Ok(output)
    }

    /// Serialized tag of this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Log(_) => "log",
            Self::Reflog(_) => "reflog",
            Self::StashList(_) => "stash_list",
            Self::Fetch(_) => "fetch",
            Self::Pull(_) => "pull",
            Self::Clean(_) => "clean",
            Self::Branches(_) => "branches",
            Self::Worktrees(_) => "worktrees",
            Self::Tags(_) => "tags",
            Self::Remotes(_) => "remotes",
            Self::DiffStat(_) => "diff_stat",
            Self::Commit(_) => "commit",
            Self::Merge(_) => "merge",
            Self::Text(_) => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{CleanOptions, DiffOptions, ShowOptions};
    use pretty_assertions::assert_eq;

    fn ok(stdout: &str, stderr: &str) -> ProcessResult {
        ProcessResult {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_diff_without_stat_is_text() {
        let op = GitOperation::Diff(DiffOptions::default());
        let output = OperationOutput::parse(&op, &ok("diff --git a/x b/x\n", "")).unwrap();
        assert_eq!(output.kind(), "text");
    }

    #[test]
    fn test_diff_stat_is_parsed() {
        let op = GitOperation::Diff(DiffOptions {
            stat: true,
            ..Default::default()
        });
        let output = OperationOutput::parse(&op, &ok("1\t2\ta.txt\n", "")).unwrap();
        assert!(matches!(output, OperationOutput::DiffStat(ref e) if e.len() == 1));
    }

    #[test]
    fn test_clean_passes_dry_run() {
        let op = GitOperation::Clean(CleanOptions::default());
        let output = OperationOutput::parse(&op, &ok("Would remove junk.txt\n", "")).unwrap();
        match output {
            OperationOutput::Clean(report) => {
                assert!(report.dry_run);
                assert_eq!(report.files, vec!["junk.txt"]);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_serialized_shape() {
        let op = GitOperation::Show(ShowOptions::default());
        let output = OperationOutput::parse(&op, &ok("commit abc\n", "")).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["result"]["stdout"], "commit abc\n");
    }
}
