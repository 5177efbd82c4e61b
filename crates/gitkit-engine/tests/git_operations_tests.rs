//! Operations against real repositories through the `git` CLI

use gitkit_engine::{
    BranchOptions, CleanOptions, CliGitProvider, CommitOptions, EngineConfig, Error,
    ErrorCategory, ExecutionContext, FetchOptions, GitOperation, GitProvider, LogOptions,
    MergeOptions, OperationOutput, ReflogOptions, RemoteOptions, StashOptions, StatusOptions,
    WorktreeOptions,
};
use gitkit_engine::parse::{MergeOutcome, RefUpdateKind};
use gitkit_test_utils::TestRepo;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn provider() -> CliGitProvider {
    CliGitProvider::new(EngineConfig::default())
}

fn ctx(repo: &TestRepo) -> ExecutionContext {
    ExecutionContext::for_path(repo.root())
}

#[tokio::test]
async fn test_status_categorizes_changes() {
    let repo = TestRepo::with_commit();
    repo.write("README.md", "# Changed\n");
    repo.write("new.txt", "untracked\n");
    repo.write("staged.txt", "staged\n");
    repo.git(&["add", "staged.txt"]);

    let report = provider()
        .status(StatusOptions::default(), &ctx(&repo))
        .await
        .unwrap();

    assert_eq!(report.branch.as_deref(), Some("main"));
    assert_eq!(report.head.as_deref(), Some(repo.head().as_str()));
    assert_eq!(report.modified, vec!["README.md"]);
    assert_eq!(report.added, vec!["staged.txt"]);
    assert_eq!(report.untracked, vec!["new.txt"]);
    assert!(!report.is_clean());
}

#[tokio::test]
async fn test_status_of_fresh_repository() {
    let repo = TestRepo::new();

    let report = provider()
        .status(StatusOptions::default(), &ctx(&repo))
        .await
        .unwrap();

    assert_eq!(report.branch.as_deref(), Some("main"));
    assert_eq!(report.head, None);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_log_returns_newest_first() {
    let repo = TestRepo::with_commit();
    repo.commit_file("a.txt", "a\n", "Add a");
    repo.commit_file("b.txt", "b\n", "Add b: with colon");

    let commits = provider()
        .log(
            LogOptions {
                max_count: Some(2),
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap();

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].subject, "Add b: with colon");
    assert_eq!(commits[0].hash, repo.head());
    assert_eq!(commits[0].author_email, "test@test.com");
    assert_eq!(commits[0].parents, vec![commits[1].hash.clone()]);
    assert_eq!(commits[1].subject, "Add a");
}

#[tokio::test]
async fn test_log_filters_by_path() {
    let repo = TestRepo::with_commit();
    repo.commit_file("docs/guide.md", "guide\n", "Add guide");
    repo.commit_file("src/main.rs", "fn main() {}\n", "Add main");

    let commits = provider()
        .log(
            LogOptions {
                paths: vec!["docs".into()],
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap();

    let subjects: Vec<_> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Add guide"]);
}

#[tokio::test]
async fn test_unknown_revision_is_not_found() {
    let repo = TestRepo::with_commit();

    let err = provider()
        .log(
            LogOptions {
                revision: Some("does-not-exist".into()),
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ref_not_found");
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn test_outside_repository_is_reported() {
    let temp = TempDir::new().unwrap();
    let mut config = EngineConfig::default();
    config.env.insert(
        "GIT_CEILING_DIRECTORIES".into(),
        temp.path().parent().unwrap().display().to_string(),
    );

    let err = CliGitProvider::new(config)
        .status(StatusOptions::default(), &ExecutionContext::for_path(temp.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotARepository { .. }), "{err:?}");
}

#[tokio::test]
async fn test_reflog_records_commits() {
    let repo = TestRepo::with_commit();
    repo.commit_file("a.txt", "a\n", "Second");

    let entries = provider()
        .reflog(ReflogOptions::default(), &ctx(&repo))
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 0);
    assert_eq!(entries[0].ref_name, "HEAD");
    assert_eq!(entries[0].action, "commit");
    assert_eq!(entries[0].message, "Second");
    assert_eq!(entries[1].action, "commit (initial)");
    assert!(entries[0].timestamp >= entries[1].timestamp);
    assert!(repo.head().starts_with(&entries[0].hash));
}

#[tokio::test]
async fn test_stash_push_list_pop() {
    let repo = TestRepo::with_commit();
    let provider = provider();
    let ctx = ctx(&repo);
    repo.write("README.md", "# Work in progress\n");

    provider
        .execute(
            GitOperation::Stash(StashOptions::Push {
                message: Some("parked".into()),
                include_untracked: false,
                keep_index: false,
            }),
            &ctx,
        )
        .await
        .unwrap();

    let stashes = provider.stash_list(&ctx).await.unwrap();
    assert_eq!(stashes.len(), 1);
    assert_eq!(stashes[0].reference(), "stash@{0}");
    assert_eq!(stashes[0].branch.as_deref(), Some("main"));
    assert!(stashes[0].description.ends_with("parked"));

    provider
        .execute(GitOperation::Stash(StashOptions::Pop { index: None }), &ctx)
        .await
        .unwrap();
    assert!(provider.stash_list(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clean_dry_run_is_idempotent() {
    let repo = TestRepo::with_commit();
    repo.write("junk.txt", "x\n");
    repo.write("build/out.o", "x\n");
    let provider = provider();
    let options = CleanOptions {
        directories: true,
        ..Default::default()
    };

    let first = provider.clean(options.clone(), &ctx(&repo)).await.unwrap();
    let second = provider.clean(options, &ctx(&repo)).await.unwrap();

    assert!(first.dry_run);
    assert_eq!(first.files, vec!["junk.txt"]);
    assert_eq!(first.directories, vec!["build"]);
    assert_eq!(first, second);
    repo.assert_file_exists("junk.txt");
}

#[tokio::test]
async fn test_clean_removes_when_not_dry_run() {
    let repo = TestRepo::with_commit();
    repo.write("junk.txt", "x\n");

    let report = provider()
        .clean(
            CleanOptions {
                dry_run: false,
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap();

    assert!(!report.dry_run);
    assert_eq!(report.files, vec!["junk.txt"]);
    repo.assert_file_missing("junk.txt");
}

#[tokio::test]
async fn test_branch_lifecycle() {
    let repo = TestRepo::with_commit();
    let provider = provider();
    let ctx = ctx(&repo);

    provider
        .execute(
            GitOperation::Branch(BranchOptions::Create {
                name: "feature".into(),
                start_point: None,
                force: false,
            }),
            &ctx,
        )
        .await
        .unwrap();

    let branches = provider.branches(false, false, &ctx).await.unwrap();
    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["feature", "main"]);
    assert!(branches.iter().any(|b| b.name == "main" && b.is_current));
    assert!(branches.iter().all(|b| b.commit == repo.head()));

    let err = provider
        .execute(
            GitOperation::Branch(BranchOptions::Create {
                name: "main".into(),
                start_point: None,
                force: false,
            }),
            &ctx,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "already_exists");
}

#[tokio::test]
async fn test_commit_reports_summary() {
    let repo = TestRepo::with_commit();
    repo.write("a.txt", "one\ntwo\n");
    repo.git(&["add", "a.txt"]);

    let summary = provider()
        .commit(
            CommitOptions {
                message: "Add a".into(),
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap();

    assert_eq!(summary.branch, "main");
    assert_eq!(summary.subject, "Add a");
    assert!(!summary.root_commit);
    assert!(repo.head().starts_with(&summary.short_hash));
    let stats = summary.stats.unwrap();
    assert_eq!(stats.files_changed, 1);
    assert_eq!(stats.insertions, 2);
}

#[tokio::test]
async fn test_merge_conflict_then_abort() {
    let repo = TestRepo::with_commit();
    repo.git(&["checkout", "-b", "feature"]);
    repo.commit_file("README.md", "# Feature\n", "Feature edit");
    repo.git(&["checkout", "main"]);
    repo.commit_file("README.md", "# Main\n", "Main edit");
    let provider = provider();
    let ctx = ctx(&repo);

    let err = provider
        .merge(
            MergeOptions {
                branch: Some("feature".into()),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap_err();
    match &err {
        Error::MergeConflict { detail, .. } => assert!(detail.contains("README.md")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Conflict);

    let status = provider.status(StatusOptions::default(), &ctx).await.unwrap();
    assert_eq!(status.conflicted, vec!["README.md"]);

    let report = provider
        .merge(
            MergeOptions {
                abort: true,
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(report.outcome, MergeOutcome::Aborted);
}

#[tokio::test]
async fn test_merge_fast_forward() {
    let repo = TestRepo::with_commit();
    repo.git(&["checkout", "-b", "feature"]);
    repo.commit_file("f.txt", "f\n", "Feature");
    repo.git(&["checkout", "main"]);

    let report = provider()
        .merge(
            MergeOptions {
                branch: Some("feature".into()),
                ..Default::default()
            },
            &ctx(&repo),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome, MergeOutcome::FastForward);
    repo.assert_file_exists("f.txt");
}

#[tokio::test]
async fn test_fetch_reports_new_branches() {
    let upstream = TestRepo::with_commit();
    upstream.git(&["branch", "feature"]);
    let repo = TestRepo::new();
    let provider = provider();
    let ctx = ctx(&repo);

    provider
        .execute(
            GitOperation::Remote(RemoteOptions::Add {
                name: "origin".into(),
                url: upstream.root().display().to_string(),
            }),
            &ctx,
        )
        .await
        .unwrap();

    let report = provider
        .fetch(
            FetchOptions {
                remote: Some("origin".into()),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap();

    let mut new_branches: Vec<_> = report.new_branches().collect();
    new_branches.sort_unstable();
    assert_eq!(new_branches, vec!["origin/feature", "origin/main"]);
    assert!(report.updates.iter().all(|u| u.kind == RefUpdateKind::NewBranch));

    let again = provider
        .fetch(
            FetchOptions {
                remote: Some("origin".into()),
                ..Default::default()
            },
            &ctx,
        )
        .await
        .unwrap();
    assert!(again.updates.is_empty());
}

#[tokio::test]
async fn test_worktree_add_and_list() {
    let repo = TestRepo::with_commit();
    let outside = TempDir::new().unwrap();
    let path = outside.path().join("wt-feature");
    let provider = provider();
    let ctx = ctx(&repo);

    provider
        .execute(
            GitOperation::Worktree(WorktreeOptions::Add {
                path: path.display().to_string(),
                branch: None,
                new_branch: Some("wt-feature".into()),
            }),
            &ctx,
        )
        .await
        .unwrap();

    let output = provider
        .execute(GitOperation::Worktree(WorktreeOptions::List {}), &ctx)
        .await
        .unwrap();
    let OperationOutput::Worktrees(worktrees) = output else {
        panic!("unexpected output: {output:?}");
    };
    assert_eq!(worktrees.len(), 2);
    assert_eq!(worktrees[0].branch.as_deref(), Some("main"));
    assert_eq!(worktrees[1].branch.as_deref(), Some("wt-feature"));
}

#[tokio::test]
async fn test_execute_named_with_json_options() {
    let repo = TestRepo::with_commit();
    repo.commit_file("a.txt", "a\n", "Add a");

    let output = provider()
        .execute_named("log", json!({ "max_count": 1 }), &ctx(&repo))
        .await
        .unwrap();

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["kind"], "log");
    assert_eq!(value["result"][0]["subject"], "Add a");
}

#[tokio::test]
async fn test_injection_attempt_never_reaches_git() {
    let repo = TestRepo::with_commit();

    let err = provider()
        .execute_named(
            "checkout",
            json!({ "target": "--orphan=evil" }),
            &ctx(&repo),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "option_injection");
    assert_eq!(repo.git(&["branch", "--list"]).trim(), "* main");
}
