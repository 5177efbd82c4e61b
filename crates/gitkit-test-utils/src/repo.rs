//! [`TestRepo`]: a temporary git repository for engine and CLI tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git;

/// A repository in a temporary directory, removed on drop.
///
/// # Example
///
/// ```rust,no_run
/// use gitkit_test_utils::TestRepo;
///
/// let repo = TestRepo::with_commit();
/// repo.write("notes.txt", "draft\n");
/// repo.assert_file_exists("notes.txt");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl TestRepo {
    /// Empty directory, not yet a repository.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap_or_else(|e| panic!("TestRepo: tempdir: {e}")),
        }
    }

    /// Initialised repository on `main` without commits.
    pub fn new() -> Self {
        let repo = Self::empty();
        git::init_repo(repo.root());
        repo
    }

    /// Repository with a single commit adding `README.md`.
    pub fn with_commit() -> Self {
        let repo = Self::empty();
        git::repo_with_commit(repo.root());
        repo
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Run git in the repository and return stdout.
    pub fn git(&self, args: &[&str]) -> String {
        git::git(self.root(), args)
    }

    pub fn write(&self, name: &str, content: &str) {
        git::write_file(self.root(), name, content);
    }

    pub fn commit_file(&self, name: &str, content: &str, message: &str) {
        git::commit_file(self.root(), name, content, message);
    }

    pub fn head(&self) -> String {
        git::rev_parse(self.root(), "HEAD")
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn assert_file_missing(&self, relative: &str) {
        let path = self.path(relative);
        assert!(!path.exists(), "Expected file to be absent: {}", path.display());
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
