//! Provider abstraction
//!
//! Callers program against [`GitProvider`]; [`CliGitProvider`] is the
//! implementation that drives the `git` executable.

mod cli;

pub use cli::CliGitProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::operation::{
    BranchOptions, CleanOptions, CommitOptions, FetchOptions, GitOperation, LogOptions,
    MergeOptions, OperationKind, PullOptions, ReflogOptions, StashOptions, StatusOptions,
};
use crate::output::OperationOutput;
use crate::parse::{
    BranchInfo, CleanReport, CommitInfo, CommitSummary, FetchReport, MergeReport, PullReport,
    ReflogEntry, StashEntry, StatusReport,
};
use crate::{Error, Result};

/// One supported operation and the option names it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCapability {
    pub name: String,
    pub options: Vec<String>,
}

/// What a provider can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub provider: String,
    pub supported_operations: Vec<String>,
    pub operations: Vec<OperationCapability>,
    /// Commit-creating operations are signed, with one unsigned retry
    pub commit_signing: bool,
}

impl ProviderCapabilities {
    /// Capabilities covering every [`OperationKind`].
    pub fn all_operations(provider: &str, commit_signing: bool) -> Self {
        let operations: Vec<OperationCapability> = OperationKind::ALL
            .iter()
            .map(|kind| OperationCapability {
                name: kind.name().to_string(),
                options: kind.option_names().iter().map(|o| o.to_string()).collect(),
            })
            .collect();
        Self {
            provider: provider.to_string(),
            supported_operations: operations.iter().map(|o| o.name.clone()).collect(),
            operations,
            commit_signing,
        }
    }

    pub fn supports(&self, operation: &str) -> bool {
        self.supported_operations.iter().any(|o| o == operation)
    }
}

fn unexpected(kind: OperationKind, output: &OperationOutput) -> Error {
    Error::UnexpectedOutput {
        operation: kind.name().to_string(),
        kind: output.kind().to_string(),
    }
}

/// Git backend interface.
///
/// Only [`capabilities`](Self::capabilities) and [`execute`](Self::execute)
/// are required; the typed entry points are conveniences over `execute`.
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn capabilities(&self) -> ProviderCapabilities;

    async fn execute(
        &self,
        operation: GitOperation,
        ctx: &ExecutionContext,
    ) -> Result<OperationOutput>;

    /// Execute an operation given by name with JSON options.
    async fn execute_named(
        &self,
        name: &str,
        options: Value,
        ctx: &ExecutionContext,
    ) -> Result<OperationOutput> {
        if !self.capabilities().supports(name) {
            return Err(Error::UnknownOperation(name.to_string()));
        }
        let operation = GitOperation::from_parts(name, options)?;
        self.execute(operation, ctx).await
    }

    async fn status(&self, options: StatusOptions, ctx: &ExecutionContext) -> Result<StatusReport> {
        match self.execute(GitOperation::Status(options), ctx).await? {
            OperationOutput::Status(report) => Ok(report),
            other => Err(unexpected(OperationKind::Status, &other)),
        }
    }

    async fn log(&self, options: LogOptions, ctx: &ExecutionContext) -> Result<Vec<CommitInfo>> {
        match self.execute(GitOperation::Log(options), ctx).await? {
            OperationOutput::Log(commits) => Ok(commits),
            other => Err(unexpected(OperationKind::Log, &other)),
        }
    }

    async fn reflog(
        &self,
        options: ReflogOptions,
        ctx: &ExecutionContext,
    ) -> Result<Vec<ReflogEntry>> {
        match self.execute(GitOperation::Reflog(options), ctx).await? {
            OperationOutput::Reflog(entries) => Ok(entries),
            other => Err(unexpected(OperationKind::Reflog, &other)),
        }
    }

    async fn stash_list(&self, ctx: &ExecutionContext) -> Result<Vec<StashEntry>> {
        match self.execute(GitOperation::Stash(StashOptions::List {}), ctx).await? {
            OperationOutput::StashList(entries) => Ok(entries),
            other => Err(unexpected(OperationKind::Stash, &other)),
        }
    }

    async fn branches(
        &self,
        all: bool,
        remote: bool,
        ctx: &ExecutionContext,
    ) -> Result<Vec<BranchInfo>> {
        let operation = GitOperation::Branch(BranchOptions::List { all, remote });
        match self.execute(operation, ctx).await? {
            OperationOutput::Branches(branches) => Ok(branches),
            other => Err(unexpected(OperationKind::Branch, &other)),
        }
    }

    async fn fetch(&self, options: FetchOptions, ctx: &ExecutionContext) -> Result<FetchReport> {
        match self.execute(GitOperation::Fetch(options), ctx).await? {
            OperationOutput::Fetch(report) => Ok(report),
            other => Err(unexpected(OperationKind::Fetch, &other)),
        }
    }

    async fn pull(&self, options: PullOptions, ctx: &ExecutionContext) -> Result<PullReport> {
        match self.execute(GitOperation::Pull(options), ctx).await? {
            OperationOutput::Pull(report) => Ok(report),
            other => Err(unexpected(OperationKind::Pull, &other)),
        }
    }

    async fn clean(&self, options: CleanOptions, ctx: &ExecutionContext) -> Result<CleanReport> {
        match self.execute(GitOperation::Clean(options), ctx).await? {
            OperationOutput::Clean(report) => Ok(report),
            other => Err(unexpected(OperationKind::Clean, &other)),
        }
    }

    async fn commit(
        &self,
        options: CommitOptions,
        ctx: &ExecutionContext,
    ) -> Result<CommitSummary> {
        match self.execute(GitOperation::Commit(options), ctx).await? {
            OperationOutput::Commit(summary) => Ok(summary),
            other => Err(unexpected(OperationKind::Commit, &other)),
        }
    }

    async fn merge(&self, options: MergeOptions, ctx: &ExecutionContext) -> Result<MergeReport> {
        match self.execute(GitOperation::Merge(options), ctx).await? {
            OperationOutput::Merge(report) => Ok(report),
            other => Err(unexpected(OperationKind::Merge, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_cover_every_operation() {
        let caps = ProviderCapabilities::all_operations("git-cli", false);
        assert_eq!(caps.supported_operations.len(), OperationKind::ALL.len());
        assert!(caps.supports("worktree"));
        assert!(!caps.supports("rebase"));

        let reset = caps.operations.iter().find(|o| o.name == "reset").unwrap();
        assert_eq!(reset.options, vec!["mode", "target", "paths"]);
    }
}
