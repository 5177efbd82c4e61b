//! Git repository fixtures built with the `git` CLI.
//!
//! Every helper panics on failure; they are meant for test setup only.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git` in `path` with a clean, deterministic environment and return
/// stdout.
///
/// # Panics
/// Panics if git cannot be started or exits non-zero.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C")
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialise an empty repository on branch `main` with a local identity and
/// signing disabled.
///
/// # Panics
/// Panics if any git command fails.
pub fn init_repo(path: &Path) {
    git(path, &["init", "--initial-branch", "main"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgsign", "false"]);
}

/// Initialise a repository with one commit adding `README.md`.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn repo_with_commit(path: &Path) {
    init_repo(path);
    commit_file(path, "README.md", "# Test\n", "Initial commit");
}

/// Write `name` (creating parent directories), stage it and commit.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn commit_file(path: &Path, name: &str, content: &str, message: &str) {
    write_file(path, name, content);
    git(path, &["add", "--", name]);
    git(path, &["commit", "-m", message]);
}

/// Write `name` relative to `path` without staging it.
///
/// # Panics
/// Panics if the write fails.
pub fn write_file(path: &Path, name: &str, content: &str) {
    let file = path.join(name);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&file, content)
        .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", file.display()));
}

/// Full hash of `rev` in the repository at `path`.
pub fn rev_parse(path: &Path, rev: &str) -> String {
    git(path, &["rev-parse", rev]).trim().to_string()
}
