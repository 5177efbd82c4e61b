//! Resource limits and process environment, using stand-in git programs

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gitkit_engine::{
    CliGitProvider, EngineConfig, Error, ErrorCategory, ExecutionContext, GitOperation,
    GitProvider, OperationOutput, ShowOptions, StatusOptions,
};
use tempfile::TempDir;

/// Write an executable shell script standing in for git.
#[cfg(unix)]
fn fake_git(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-git");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn provider_with(git_binary: PathBuf, configure: impl FnOnce(&mut EngineConfig)) -> CliGitProvider {
    let mut config = EngineConfig {
        git_binary,
        ..Default::default()
    };
    configure(&mut config);
    CliGitProvider::new(config)
}

#[cfg(unix)]
#[tokio::test]
async fn test_hung_process_times_out() {
    let temp = TempDir::new().unwrap();
    let git = fake_git(temp.path(), "sleep 10");
    let provider = provider_with(git, |c| c.timeout_ms = 200);

    let started = Instant::now();
    let err = provider
        .status(StatusOptions::default(), &ExecutionContext::for_path(temp.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 200, .. }), "{err:?}");
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[cfg(unix)]
#[tokio::test]
async fn test_runaway_output_is_capped() {
    let temp = TempDir::new().unwrap();
    let git = fake_git(temp.path(), "exec yes");
    let provider = provider_with(git, |c| c.max_buffer_bytes = 4096);

    let err = provider
        .execute(
            GitOperation::Show(ShowOptions::default()),
            &ExecutionContext::for_path(temp.path()),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::OutputLimitExceeded { limit_bytes: 4096, .. }),
        "{err:?}"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_environment_is_non_interactive() {
    let temp = TempDir::new().unwrap();
    let git = fake_git(temp.path(), "env");
    let provider = provider_with(git, |c| {
        c.env.insert("GIT_CONFIG_NOSYSTEM".into(), "1".into());
    });

    let output = provider
        .execute(
            GitOperation::Show(ShowOptions::default()),
            &ExecutionContext::for_path(temp.path()),
        )
        .await
        .unwrap();

    let OperationOutput::Text(text) = output else {
        panic!("show should produce text output");
    };
    let lines: Vec<&str> = text.stdout.lines().collect();
    for expected in [
        "GIT_TERMINAL_PROMPT=0",
        "GCM_INTERACTIVE=never",
        "GIT_EDITOR=true",
        "LC_ALL=C",
        "GIT_CONFIG_NOSYSTEM=1",
    ] {
        assert!(lines.contains(&expected), "missing {expected}");
    }
    assert!(!lines.iter().any(|l| l.starts_with("GIT_ASKPASS=")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_arguments_reach_git_verbatim() {
    let temp = TempDir::new().unwrap();
    let git = fake_git(temp.path(), r#"for a in "$@"; do echo "[$a]"; done"#);
    let provider = provider_with(git, |_| {});

    let output = provider
        .execute_named(
            "diff",
            serde_json::json!({ "revision": "HEAD", "paths": ["dir with space/file"] }),
            &ExecutionContext::for_path(temp.path()),
        )
        .await
        .unwrap();

    let OperationOutput::Text(text) = output else {
        panic!("diff should produce text output");
    };
    assert_eq!(
        text.stdout.lines().collect::<Vec<_>>(),
        vec!["[diff]", "[--no-ext-diff]", "[HEAD]", "[--]", "[dir with space/file]"]
    );
}

#[tokio::test]
async fn test_missing_program_is_spawn_failure() {
    let temp = TempDir::new().unwrap();
    let provider = provider_with(PathBuf::from("/nonexistent/bin/git"), |_| {});

    let err = provider
        .status(StatusOptions::default(), &ExecutionContext::for_path(temp.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SpawnFailed { .. }), "{err:?}");
    assert_eq!(err.category(), ErrorCategory::Internal);
    assert_eq!(err.to_record().code, "spawn_failed");
}
