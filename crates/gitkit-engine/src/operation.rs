//! Supported git operations and their typed options
//!
//! Every option struct documents its defaults through `Default`; a missing
//! field in a JSON request takes the value shown there, never an implicit
//! "undefined".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Default number of commits returned by `log` when `max_count` is absent.
pub const DEFAULT_LOG_LIMIT: u32 = 50;

/// Identifier of a supported operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Status,
    Log,
    Diff,
    Show,
    Add,
    Commit,
    Branch,
    Checkout,
    Merge,
    Reset,
    Stash,
    Worktree,
    Reflog,
    Fetch,
    Pull,
    Push,
    Clean,
    Tag,
    Remote,
    Init,
}

impl OperationKind {
    pub const ALL: [OperationKind; 20] = [
        OperationKind::Status,
        OperationKind::Log,
        OperationKind::Diff,
        OperationKind::Show,
        OperationKind::Add,
        OperationKind::Commit,
        OperationKind::Branch,
        OperationKind::Checkout,
        OperationKind::Merge,
        OperationKind::Reset,
        OperationKind::Stash,
        OperationKind::Worktree,
        OperationKind::Reflog,
        OperationKind::Fetch,
        OperationKind::Pull,
        OperationKind::Push,
        OperationKind::Clean,
        OperationKind::Tag,
        OperationKind::Remote,
        OperationKind::Init,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Status => "status",
            OperationKind::Log => "log",
            OperationKind::Diff => "diff",
            OperationKind::Show => "show",
            OperationKind::Add => "add",
            OperationKind::Commit => "commit",
            OperationKind::Branch => "branch",
            OperationKind::Checkout => "checkout",
            OperationKind::Merge => "merge",
            OperationKind::Reset => "reset",
            OperationKind::Stash => "stash",
            OperationKind::Worktree => "worktree",
            OperationKind::Reflog => "reflog",
            OperationKind::Fetch => "fetch",
            OperationKind::Pull => "pull",
            OperationKind::Push => "push",
            OperationKind::Clean => "clean",
            OperationKind::Tag => "tag",
            OperationKind::Remote => "remote",
            OperationKind::Init => "init",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Option field names accepted for this operation.
    pub fn option_names(self) -> &'static [&'static str] {
        match self {
            OperationKind::Status => &["include_untracked"],
            OperationKind::Log => &["max_count", "revision", "paths", "author", "since"],
            OperationKind::Diff => &["staged", "revision", "paths", "stat"],
            OperationKind::Show => &["revision", "stat"],
            OperationKind::Add => &["paths", "all", "update"],
            OperationKind::Commit => &["message", "all", "amend", "allow_empty", "no_verify"],
            OperationKind::Branch => &[
                "action",
                "all",
                "remote",
                "name",
                "start_point",
                "force",
                "old_name",
                "new_name",
            ],
            OperationKind::Checkout => &["target", "create", "start_point", "paths", "force"],
            OperationKind::Merge => &["branch", "message", "no_ff", "ff_only", "squash", "abort"],
            OperationKind::Reset => &["mode", "target", "paths"],
            OperationKind::Stash => &[
                "action",
                "message",
                "include_untracked",
                "keep_index",
                "index",
            ],
            OperationKind::Worktree => &["action", "path", "branch", "new_branch", "force"],
            OperationKind::Reflog => &["reference", "max_count"],
            OperationKind::Fetch => &["remote", "all", "prune", "tags"],
            OperationKind::Pull => &["remote", "branch", "rebase", "ff_only"],
            OperationKind::Push => &[
                "remote",
                "branch",
                "set_upstream",
                "force_with_lease",
                "tags",
            ],
            OperationKind::Clean => &["dry_run", "directories", "ignored", "paths"],
            OperationKind::Tag => &["action", "pattern", "name", "target", "message"],
            OperationKind::Remote => &["action", "name", "url"],
            OperationKind::Init => &["bare", "initial_branch"],
        }
    }

    /// Action used when a request for a multi-action operation omits one.
    ///
    /// Always the read-only listing action.
    fn default_action(self) -> Option<&'static str> {
        match self {
            OperationKind::Branch
            | OperationKind::Stash
            | OperationKind::Worktree
            | OperationKind::Tag
            | OperationKind::Remote => Some("list"),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A git operation together with its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "options", rename_all = "snake_case")]
pub enum GitOperation {
    Status(StatusOptions),
    Log(LogOptions),
    Diff(DiffOptions),
    Show(ShowOptions),
    Add(AddOptions),
    Commit(CommitOptions),
    Branch(BranchOptions),
    Checkout(CheckoutOptions),
    Merge(MergeOptions),
    Reset(ResetOptions),
    Stash(StashOptions),
    Worktree(WorktreeOptions),
    Reflog(ReflogOptions),
    Fetch(FetchOptions),
    Pull(PullOptions),
    Push(PushOptions),
    Clean(CleanOptions),
    Tag(TagOptions),
    Remote(RemoteOptions),
    Init(InitOptions),
}

impl GitOperation {
    /// Build an operation from its name and a JSON options object.
    ///
    /// `null` options are treated as `{}`. Multi-action operations without an
    /// `action` field default to listing.
    pub fn from_parts(name: &str, options: Value) -> Result<Self> {
        let kind =
            OperationKind::from_name(name).ok_or_else(|| Error::UnknownOperation(name.into()))?;

        let mut options = match options {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(Error::InvalidOptions {
                    operation: name.into(),
                    message: format!("options must be an object, got {}", json_type(&other)),
                });
            }
        };

        if let (Some(action), Some(map)) = (kind.default_action(), options.as_object_mut()) {
            map.entry("action")
                .or_insert_with(|| Value::String(action.into()));
        }

        let envelope = serde_json::json!({ "operation": name, "options": options });
        serde_json::from_value(envelope).map_err(|e| Error::InvalidOptions {
            operation: name.into(),
            message: e.to_string(),
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            GitOperation::Status(_) => OperationKind::Status,
            GitOperation::Log(_) => OperationKind::Log,
            GitOperation::Diff(_) => OperationKind::Diff,
            GitOperation::Show(_) => OperationKind::Show,
            GitOperation::Add(_) => OperationKind::Add,
            GitOperation::Commit(_) => OperationKind::Commit,
            GitOperation::Branch(_) => OperationKind::Branch,
            GitOperation::Checkout(_) => OperationKind::Checkout,
            GitOperation::Merge(_) => OperationKind::Merge,
            GitOperation::Reset(_) => OperationKind::Reset,
            GitOperation::Stash(_) => OperationKind::Stash,
            GitOperation::Worktree(_) => OperationKind::Worktree,
            GitOperation::Reflog(_) => OperationKind::Reflog,
            GitOperation::Fetch(_) => OperationKind::Fetch,
            GitOperation::Pull(_) => OperationKind::Pull,
            GitOperation::Push(_) => OperationKind::Push,
            GitOperation::Clean(_) => OperationKind::Clean,
            GitOperation::Tag(_) => OperationKind::Tag,
            GitOperation::Remote(_) => OperationKind::Remote,
            GitOperation::Init(_) => OperationKind::Init,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Whether a successful run writes a new commit object that may be signed.
    pub fn creates_commit(&self) -> bool {
        match self {
            GitOperation::Commit(_) => true,
            GitOperation::Merge(opts) => !opts.abort,
            _ => false,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `git status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusOptions {
    /// Report untracked files (default: true)
    pub include_untracked: bool,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            include_untracked: true,
        }
    }
}

/// `git log`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogOptions {
    /// Maximum commits returned (default: [`DEFAULT_LOG_LIMIT`])
    pub max_count: Option<u32>,
    /// Revision or range to walk (default: HEAD)
    pub revision: Option<String>,
    pub paths: Vec<String>,
    pub author: Option<String>,
    /// Anything `git log --since` accepts, e.g. `2024-01-01`
    pub since: Option<String>,
}

/// `git diff`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffOptions {
    /// Diff the index against HEAD instead of the worktree against the index
    pub staged: bool,
    pub revision: Option<String>,
    pub paths: Vec<String>,
    /// Return per-file line counts instead of the patch text
    pub stat: bool,
}

/// `git show`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowOptions {
    /// Object to show (default: HEAD)
    pub revision: Option<String>,
    pub stat: bool,
}

/// `git add`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddOptions {
    pub paths: Vec<String>,
    /// Stage every change including untracked files (`-A`)
    pub all: bool,
    /// Stage modifications and deletions of tracked files only (`-u`)
    pub update: bool,
}

/// `git commit`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommitOptions {
    /// Required, must not be blank
    pub message: String,
    pub all: bool,
    pub amend: bool,
    pub allow_empty: bool,
    pub no_verify: bool,
}

/// `git branch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum BranchOptions {
    List {
        #[serde(default)]
        all: bool,
        #[serde(default)]
        remote: bool,
    },
    Create {
        name: String,
        #[serde(default)]
        start_point: Option<String>,
        #[serde(default)]
        force: bool,
    },
    Delete {
        name: String,
        #[serde(default)]
        force: bool,
    },
    Rename {
        /// Branch to rename (default: current branch)
        #[serde(default)]
        old_name: Option<String>,
        new_name: String,
    },
}

impl Default for BranchOptions {
    fn default() -> Self {
        BranchOptions::List {
            all: false,
            remote: false,
        }
    }
}

/// `git checkout`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckoutOptions {
    /// Branch or commit to switch to, or the source of `paths`
    pub target: Option<String>,
    /// Create `target` as a new branch (`-b`)
    pub create: bool,
    /// Starting point for a branch created with `create`
    pub start_point: Option<String>,
    /// Restore these paths instead of switching branches
    pub paths: Vec<String>,
    pub force: bool,
}

/// `git merge`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeOptions {
    /// Branch to merge; required unless `abort` is set
    pub branch: Option<String>,
    pub message: Option<String>,
    pub no_ff: bool,
    pub ff_only: bool,
    pub squash: bool,
    /// Abort an in-progress merge; other fields are ignored
    pub abort: bool,
}

/// Reset mode for `git reset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
}

impl ResetMode {
    pub fn flag(self) -> &'static str {
        match self {
            ResetMode::Soft => "--soft",
            ResetMode::Mixed => "--mixed",
            ResetMode::Hard => "--hard",
        }
    }
}

/// `git reset`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResetOptions {
    /// Default: mixed
    pub mode: ResetMode,
    /// Commit to reset to (default: HEAD)
    pub target: Option<String>,
    /// Only reset these paths; requires mixed mode
    pub paths: Vec<String>,
}

/// `git stash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum StashOptions {
    Push {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        include_untracked: bool,
        #[serde(default)]
        keep_index: bool,
    },
    Pop {
        #[serde(default)]
        index: Option<u32>,
    },
    Apply {
        #[serde(default)]
        index: Option<u32>,
    },
    Drop {
        #[serde(default)]
        index: Option<u32>,
    },
    List {},
    Clear {},
}

impl Default for StashOptions {
    fn default() -> Self {
        StashOptions::List {}
    }
}

/// `git worktree`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum WorktreeOptions {
    List {},
    Add {
        path: String,
        /// Existing branch to check out (default: git creates one named after the last path component)
        #[serde(default)]
        branch: Option<String>,
        /// Create this branch for the new worktree (`-b`)
        #[serde(default)]
        new_branch: Option<String>,
    },
    Remove {
        path: String,
        #[serde(default)]
        force: bool,
    },
    Prune {},
}

impl Default for WorktreeOptions {
    fn default() -> Self {
        WorktreeOptions::List {}
    }
}

/// `git reflog`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReflogOptions {
    /// Reference whose log is shown (default: HEAD)
    pub reference: Option<String>,
    pub max_count: Option<u32>,
}

/// `git fetch`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchOptions {
    /// Remote to fetch (default: the branch's configured remote)
    pub remote: Option<String>,
    pub all: bool,
    pub prune: bool,
    pub tags: bool,
}

/// `git pull`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PullOptions {
    pub remote: Option<String>,
    /// Requires `remote`
    pub branch: Option<String>,
    pub rebase: bool,
    pub ff_only: bool,
}

/// `git push`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PushOptions {
    pub remote: Option<String>,
    /// Requires `remote`
    pub branch: Option<String>,
    pub set_upstream: bool,
    pub force_with_lease: bool,
    pub tags: bool,
}

/// `git clean`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanOptions {
    /// Report what would be removed without deleting (default: true)
    pub dry_run: bool,
    /// Also remove untracked directories (`-d`)
    pub directories: bool,
    /// Also remove ignored files (`-x`)
    pub ignored: bool,
    pub paths: Vec<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            directories: false,
            ignored: false,
            paths: Vec::new(),
        }
    }
}

/// `git tag`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum TagOptions {
    List {
        #[serde(default)]
        pattern: Option<String>,
    },
    Create {
        name: String,
        #[serde(default)]
        target: Option<String>,
        /// Creates an annotated tag when present
        #[serde(default)]
        message: Option<String>,
    },
    Delete {
        name: String,
    },
}

impl Default for TagOptions {
    fn default() -> Self {
        TagOptions::List { pattern: None }
    }
}

/// `git remote`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum RemoteOptions {
    List {},
    Add { name: String, url: String },
    Remove { name: String },
}

impl Default for RemoteOptions {
    fn default() -> Self {
        RemoteOptions::List {}
    }
}

/// `git init`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitOptions {
    pub bare: bool,
    pub initial_branch: Option<String>,
}
