//! End-to-end agent workflows
//!
//! Drives the engine the way a remote caller does: working directories come
//! from the session store and every operation goes through `execute_named`
//! with JSON options.

use std::sync::Arc;
use std::time::Duration;

use gitkit_engine::parse::MergeOutcome;
use gitkit_engine::{
    CliGitProvider, EngineConfig, ErrorCategory, ExecutionContext, GitProvider, OperationOutput,
    ProcessRunner, Result, TokioProcessRunner,
};
use gitkit_session::{ManualClock, RequestContext, WorkingDirectoryStore};
use gitkit_test_utils::TestRepo;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

/// One tenant's session bound to a repository.
struct Agent {
    provider: Arc<CliGitProvider>,
    ctx: ExecutionContext,
}

impl Agent {
    fn new(provider: Arc<CliGitProvider>, tenant: &str, session: &str, repo: &std::path::Path) -> Self {
        let request = RequestContext::new()
            .with_tenant(tenant)
            .with_session(session);
        provider
            .store()
            .set(tenant, session, &repo.display().to_string(), None, &request)
            .unwrap();
        Self {
            provider,
            ctx: ExecutionContext::new(request),
        }
    }

    async fn try_run(&self, operation: &str, options: Value) -> Result<OperationOutput> {
        self.provider.execute_named(operation, options, &self.ctx).await
    }

    async fn run(&self, operation: &str, options: Value) -> OperationOutput {
        self.try_run(operation, options)
            .await
            .unwrap_or_else(|e| panic!("{operation} failed: {e}"))
    }
}

fn provider() -> Arc<CliGitProvider> {
    Arc::new(CliGitProvider::new(EngineConfig::default()))
}

#[tokio::test]
async fn test_feature_branch_workflow() {
    let provider = provider();
    let remote_dir = TempDir::new().unwrap();
    let origin = remote_dir.path().join("origin.git");
    std::fs::create_dir(&origin).unwrap();
    let origin_url = origin.display().to_string();

    provider
        .execute_named(
            "init",
            json!({ "bare": true, "initial_branch": "main" }),
            &ExecutionContext::for_path(&origin),
        )
        .await
        .unwrap();

    let repo = TestRepo::with_commit();
    let initial = repo.head();
    let agent = Agent::new(provider.clone(), "acme", "agent-7", repo.root());

    agent
        .run("remote", json!({ "action": "add", "name": "origin", "url": origin_url.clone() }))
        .await;
    agent
        .run("push", json!({ "remote": "origin", "branch": "main", "set_upstream": true }))
        .await;

    agent
        .run("checkout", json!({ "target": "feature", "create": true }))
        .await;
    repo.write("feature.txt", "feature\n");
    agent.run("add", json!({ "paths": ["feature.txt"] })).await;

    let OperationOutput::Commit(summary) = agent.run("commit", json!({ "message": "Add feature" })).await
    else {
        panic!("commit did not produce a summary");
    };
    assert_eq!(summary.branch, "feature");

    let OperationOutput::DiffStat(stat) = agent
        .run("diff", json!({ "revision": "main", "stat": true }))
        .await
    else {
        panic!("diff --numstat was not parsed");
    };
    assert_eq!(stat.len(), 1);
    assert_eq!(stat[0].path, "feature.txt");
    assert_eq!(stat[0].insertions, Some(1));

    agent.run("checkout", json!({ "target": "main" })).await;
    let OperationOutput::Merge(merge) = agent
        .run(
            "merge",
            json!({ "branch": "feature", "no_ff": true, "message": "Merge feature" }),
        )
        .await
    else {
        panic!("merge was not parsed");
    };
    assert_eq!(merge.outcome, MergeOutcome::Merged);
    repo.assert_file_exists("feature.txt");

    agent
        .run("tag", json!({ "action": "create", "name": "v1.0", "message": "Release" }))
        .await;
    let OperationOutput::Tags(tags) = agent.run("tag", json!({})).await else {
        panic!("tag list was not parsed");
    };
    assert_eq!(tags, vec!["v1.0"]);
    agent
        .run("push", json!({ "remote": "origin", "branch": "main", "tags": true }))
        .await;

    // A second agent picks up the published history
    let clone = TestRepo::new();
    let reviewer = Agent::new(provider.clone(), "acme", "reviewer", clone.root());
    reviewer
        .run("remote", json!({ "action": "add", "name": "origin", "url": origin.display().to_string() }))
        .await;
    let OperationOutput::Pull(pull) = reviewer
        .run("pull", json!({ "remote": "origin", "branch": "main" }))
        .await
    else {
        panic!("pull was not parsed");
    };
    assert!(!pull.conflict);
    clone.assert_file_exists("feature.txt");
    assert_eq!(clone.head(), repo.head());

    let OperationOutput::Remotes(remotes) = reviewer.run("remote", json!({})).await else {
        panic!("remote list was not parsed");
    };
    assert_eq!(remotes.len(), 1);
    assert_eq!(remotes[0].fetch_url.as_deref(), Some(origin_url.as_str()));

    // Back out the merge and drop the branch
    agent
        .run("reset", json!({ "mode": "hard", "target": "HEAD~1" }))
        .await;
    assert_eq!(repo.head(), initial);
    repo.assert_file_missing("feature.txt");

    let OperationOutput::Reflog(reflog) = agent.run("reflog", json!({ "max_count": 1 })).await
    else {
        panic!("reflog was not parsed");
    };
    assert_eq!(reflog[0].action, "reset");

    agent
        .run("branch", json!({ "action": "delete", "name": "feature", "force": true }))
        .await;
    let OperationOutput::Branches(branches) = agent.run("branch", json!({})).await else {
        panic!("branch list was not parsed");
    };
    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["main"]);
}

#[tokio::test]
async fn test_worktree_lifecycle() {
    let provider = provider();
    let repo = TestRepo::with_commit();
    let outside = TempDir::new().unwrap();
    let worktree = outside.path().join("hotfix").display().to_string();
    let agent = Agent::new(provider, "acme", "wt", repo.root());

    agent
        .run(
            "worktree",
            json!({ "action": "add", "path": worktree.clone(), "new_branch": "hotfix" }),
        )
        .await;
    let OperationOutput::Worktrees(listed) = agent.run("worktree", json!({})).await else {
        panic!("worktree list was not parsed");
    };
    assert_eq!(listed.len(), 2);

    agent
        .run("worktree", json!({ "action": "remove", "path": worktree }))
        .await;
    agent.run("worktree", json!({ "action": "prune" })).await;
    let OperationOutput::Worktrees(listed) = agent.run("worktree", json!({})).await else {
        panic!("worktree list was not parsed");
    };
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_traversal_in_pathspec_is_rejected() {
    let repo = TestRepo::with_commit();
    let agent = Agent::new(provider(), "acme", "s", repo.root());

    let err = agent
        .try_run("add", json!({ "paths": ["../outside.txt"] }))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "path_traversal");
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_tenants_do_not_share_sessions() {
    let provider = provider();
    let acme_repo = TestRepo::with_commit();
    let globex_repo = TestRepo::new();
    let acme = Agent::new(provider.clone(), "acme", "shared-id", acme_repo.root());
    let globex = Agent::new(provider.clone(), "globex", "shared-id", globex_repo.root());

    let OperationOutput::Status(acme_status) = acme.run("status", json!({})).await else {
        panic!("status was not parsed");
    };
    let OperationOutput::Status(globex_status) = globex.run("status", json!({})).await else {
        panic!("status was not parsed");
    };

    assert_eq!(acme_status.head.as_deref(), Some(acme_repo.head().as_str()));
    assert_eq!(globex_status.head, None);
}

#[tokio::test]
async fn test_expired_session_needs_new_directory() {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(WorkingDirectoryStore::with_clock(
        Some(Duration::from_secs(30)),
        clock.clone(),
    ));
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);
    let provider = Arc::new(CliGitProvider::with_parts(
        EngineConfig::default(),
        runner,
        store,
    ));
    let repo = TestRepo::with_commit();
    let agent = Agent::new(provider, "acme", "short-lived", repo.root());

    agent.run("status", json!({})).await;

    clock.advance(chrono::Duration::seconds(31));
    let err = agent.try_run("status", json!({})).await.unwrap_err();
    assert_eq!(err.code(), "missing_working_directory");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions() {
    let provider = provider();
    let repos: Vec<TestRepo> = (0..6).map(|_| TestRepo::with_commit()).collect();
    let mut tasks = tokio::task::JoinSet::new();

    for (i, repo) in repos.iter().enumerate() {
        repo.commit_file(&format!("file-{i}.txt"), "x\n", &format!("Commit {i}"));
        let agent = Agent::new(provider.clone(), "acme", &format!("agent-{i}"), repo.root());
        tasks.spawn(async move {
            let output = agent.run("log", json!({ "max_count": 1 })).await;
            (i, output)
        });
    }

    let mut seen = 0;
    while let Some(joined) = tasks.join_next().await {
        let (i, output) = joined.unwrap();
        let OperationOutput::Log(commits) = output else {
            panic!("log was not parsed");
        };
        assert_eq!(commits[0].subject, format!("Commit {i}"));
        seen += 1;
    }
    assert_eq!(seen, repos.len());
    assert_eq!(provider.store().len(), repos.len());
}
