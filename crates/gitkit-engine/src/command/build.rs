//! Operation to argument vector mapping

use super::{CommandLine, SigningMode};
use crate::operation::{
    AddOptions, BranchOptions, CheckoutOptions, CleanOptions, CommitOptions, DEFAULT_LOG_LIMIT,
    DiffOptions, FetchOptions, GitOperation, InitOptions, LogOptions, MergeOptions, OperationKind,
    PullOptions, PushOptions, ReflogOptions, RemoteOptions, ResetMode, ResetOptions, ShowOptions,
    StashOptions, StatusOptions, TagOptions, WorktreeOptions,
};
use crate::parse::{BRANCH_FORMAT, LOG_FORMAT};
use crate::{Error, Result};

/// Build the git arguments for `operation`.
///
/// `signing` only affects operations that create commits. Option
/// combinations git would reject, or that would silently do something other
/// than asked, fail here with [`Error::InvalidOptions`].
pub fn build(operation: &GitOperation, signing: SigningMode) -> Result<CommandLine> {
    let kind = operation.kind();
    let mut cmd = CommandLine::new(kind);
    cmd.word(kind.name());

    match operation {
        GitOperation::Status(opts) => status(&mut cmd, opts),
        GitOperation::Log(opts) => log(&mut cmd, opts),
        GitOperation::Diff(opts) => diff(&mut cmd, opts),
        GitOperation::Show(opts) => show(&mut cmd, opts),
        GitOperation::Add(opts) => add(&mut cmd, opts)?,
        GitOperation::Commit(opts) => commit(&mut cmd, opts, signing)?,
        GitOperation::Branch(opts) => branch(&mut cmd, opts)?,
        GitOperation::Checkout(opts) => checkout(&mut cmd, opts)?,
        GitOperation::Merge(opts) => merge(&mut cmd, opts, signing)?,
        GitOperation::Reset(opts) => reset(&mut cmd, opts)?,
        GitOperation::Stash(opts) => stash(&mut cmd, opts),
        GitOperation::Worktree(opts) => worktree(&mut cmd, opts)?,
        GitOperation::Reflog(opts) => reflog(&mut cmd, opts),
        GitOperation::Fetch(opts) => fetch(&mut cmd, opts)?,
        GitOperation::Pull(opts) => pull(&mut cmd, opts)?,
        GitOperation::Push(opts) => push(&mut cmd, opts)?,
        GitOperation::Clean(opts) => clean(&mut cmd, opts),
        GitOperation::Tag(opts) => tag(&mut cmd, opts)?,
        GitOperation::Remote(opts) => remote(&mut cmd, opts)?,
        GitOperation::Init(opts) => init(&mut cmd, opts)?,
    }

    Ok(cmd)
}

fn invalid(kind: OperationKind, message: impl Into<String>) -> Error {
    Error::InvalidOptions {
        operation: kind.name().to_string(),
        message: message.into(),
    }
}

/// Reject a blank required field.
fn required<'a>(kind: OperationKind, field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(invalid(kind, format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

fn status(cmd: &mut CommandLine, opts: &StatusOptions) {
    cmd.flag("--porcelain=v2").flag("--branch");
    cmd.flag(if opts.include_untracked {
        "--untracked-files=all"
    } else {
        "--untracked-files=no"
    });
}

fn log(cmd: &mut CommandLine, opts: &LogOptions) {
    let limit = opts.max_count.unwrap_or(DEFAULT_LOG_LIMIT);
    cmd.flag(format!("--max-count={limit}"))
        .flag(format!("--format={LOG_FORMAT}"));
    if let Some(author) = &opts.author {
        cmd.option("--author", author.clone());
    }
    if let Some(since) = &opts.since {
        cmd.option("--since", since.clone());
    }
    if let Some(revision) = &opts.revision {
        cmd.positional(revision.clone());
    }
    cmd.pathspec(&opts.paths);
}

fn diff(cmd: &mut CommandLine, opts: &DiffOptions) {
    cmd.flag("--no-ext-diff")
        .flag_if(opts.staged, "--cached")
        .flag_if(opts.stat, "--numstat");
    if let Some(revision) = &opts.revision {
        cmd.positional(revision.clone());
    }
    cmd.pathspec(&opts.paths);
}

fn show(cmd: &mut CommandLine, opts: &ShowOptions) {
    cmd.flag("--no-ext-diff").flag_if(opts.stat, "--stat");
    cmd.positional(opts.revision.clone().unwrap_or_else(|| "HEAD".into()));
}

fn add(cmd: &mut CommandLine, opts: &AddOptions) -> Result<()> {
    if opts.all && opts.update {
        return Err(invalid(OperationKind::Add, "all and update are exclusive"));
    }
    if opts.paths.is_empty() && !opts.all && !opts.update {
        return Err(invalid(
            OperationKind::Add,
            "give paths, or set all or update",
        ));
    }
    cmd.flag_if(opts.all, "-A").flag_if(opts.update, "-u");
    cmd.pathspec(&opts.paths);
    Ok(())
}

fn commit(cmd: &mut CommandLine, opts: &CommitOptions, signing: SigningMode) -> Result<()> {
    let message = required(OperationKind::Commit, "message", &opts.message)?;
    cmd.signing(signing)
        .flag_if(opts.all, "-a")
        .flag_if(opts.amend, "--amend")
        .flag_if(opts.allow_empty, "--allow-empty")
        .flag_if(opts.no_verify, "--no-verify")
        .option("-m", message);
    Ok(())
}

fn branch(cmd: &mut CommandLine, opts: &BranchOptions) -> Result<()> {
    match opts {
        BranchOptions::List { all, remote } => {
            cmd.flag("--list")
                .flag_if(*all, "-a")
                .flag_if(*remote && !*all, "-r")
                .flag(format!("--format={BRANCH_FORMAT}"));
        }
        BranchOptions::Create {
            name,
            start_point,
            force,
        } => {
            let name = required(OperationKind::Branch, "name", name)?;
            cmd.flag_if(*force, "-f").positional(name);
            if let Some(start_point) = start_point {
                cmd.positional(start_point.clone());
            }
        }
        BranchOptions::Delete { name, force } => {
            let name = required(OperationKind::Branch, "name", name)?;
            cmd.flag(if *force { "-D" } else { "-d" }).positional(name);
        }
        BranchOptions::Rename { old_name, new_name } => {
            let new_name = required(OperationKind::Branch, "new_name", new_name)?;
            cmd.flag("-m");
            if let Some(old_name) = old_name {
                cmd.positional(old_name.clone());
            }
            cmd.positional(new_name);
        }
    }
    Ok(())
}

fn checkout(cmd: &mut CommandLine, opts: &CheckoutOptions) -> Result<()> {
    let kind = OperationKind::Checkout;

    if !opts.paths.is_empty() {
        if opts.create {
            return Err(invalid(kind, "create cannot be combined with paths"));
        }
        cmd.flag_if(opts.force, "-f");
        if let Some(target) = &opts.target {
            cmd.positional(target.clone());
        }
        cmd.pathspec(&opts.paths);
        return Ok(());
    }

    let target = opts
        .target
        .as_deref()
        .ok_or_else(|| invalid(kind, "target is required unless paths are given"))?;
    let target = required(kind, "target", target)?;
    if opts.start_point.is_some() && !opts.create {
        return Err(invalid(kind, "start_point requires create"));
    }

    cmd.flag_if(opts.force, "-f");
    if opts.create {
        cmd.flag("-b");
    }
    cmd.positional(target);
    if let Some(start_point) = &opts.start_point {
        cmd.positional(start_point.clone());
    }
    Ok(())
}

fn merge(cmd: &mut CommandLine, opts: &MergeOptions, signing: SigningMode) -> Result<()> {
    let kind = OperationKind::Merge;

    if opts.abort {
        cmd.flag("--abort");
        return Ok(());
    }
    if opts.no_ff && opts.ff_only {
        return Err(invalid(kind, "no_ff and ff_only are exclusive"));
    }
    let branch = opts
        .branch
        .as_deref()
        .ok_or_else(|| invalid(kind, "branch is required unless abort is set"))?;
    let branch = required(kind, "branch", branch)?;

    cmd.flag("--no-edit")
        .signing(signing)
        .flag_if(opts.no_ff, "--no-ff")
        .flag_if(opts.ff_only, "--ff-only")
        .flag_if(opts.squash, "--squash");
    if let Some(message) = &opts.message {
        cmd.option("-m", message.clone());
    }
    cmd.positional(branch);
    Ok(())
}

fn reset(cmd: &mut CommandLine, opts: &ResetOptions) -> Result<()> {
    if !opts.paths.is_empty() && opts.mode != ResetMode::Mixed {
        return Err(invalid(
            OperationKind::Reset,
            format!("{} cannot be combined with paths", opts.mode.flag()),
        ));
    }
    cmd.flag(opts.mode.flag());
    if let Some(target) = &opts.target {
        cmd.positional(target.clone());
    }
    cmd.pathspec(&opts.paths);
    Ok(())
}

fn stash_ref(index: Option<u32>) -> Option<String> {
    index.map(|i| format!("stash@{{{i}}}"))
}

fn stash(cmd: &mut CommandLine, opts: &StashOptions) {
    match opts {
        StashOptions::Push {
            message,
            include_untracked,
            keep_index,
        } => {
            cmd.word("push")
                .flag_if(*include_untracked, "--include-untracked")
                .flag_if(*keep_index, "--keep-index");
            if let Some(message) = message {
                cmd.option("-m", message.clone());
            }
        }
        StashOptions::Pop { index } => {
            cmd.word("pop");
            if let Some(stash) = stash_ref(*index) {
                cmd.positional(stash);
            }
        }
        StashOptions::Apply { index } => {
            cmd.word("apply");
            if let Some(stash) = stash_ref(*index) {
                cmd.positional(stash);
            }
        }
        StashOptions::Drop { index } => {
            cmd.word("drop");
            if let Some(stash) = stash_ref(*index) {
                cmd.positional(stash);
            }
        }
        StashOptions::List {} => {
            cmd.word("list");
        }
        StashOptions::Clear {} => {
            cmd.word("clear");
        }
    }
}

fn worktree(cmd: &mut CommandLine, opts: &WorktreeOptions) -> Result<()> {
    let kind = OperationKind::Worktree;
    match opts {
        WorktreeOptions::List {} => {
            cmd.word("list").flag("--porcelain");
        }
        WorktreeOptions::Add {
            path,
            branch,
            new_branch,
        } => {
            let path = required(kind, "path", path)?;
            cmd.word("add");
            if let Some(new_branch) = new_branch {
                cmd.flag("-b").positional(new_branch.clone());
            }
            cmd.path(path);
            if let Some(branch) = branch {
                cmd.positional(branch.clone());
            }
        }
        WorktreeOptions::Remove { path, force } => {
            let path = required(kind, "path", path)?;
            cmd.word("remove").flag_if(*force, "--force").path(path);
        }
        WorktreeOptions::Prune {} => {
            cmd.word("prune").flag("--verbose");
        }
    }
    Ok(())
}

fn reflog(cmd: &mut CommandLine, opts: &ReflogOptions) {
    cmd.word("show").flag("--date=unix").flag("--no-decorate");
    if let Some(limit) = opts.max_count {
        cmd.flag(format!("--max-count={limit}"));
    }
    cmd.positional(opts.reference.clone().unwrap_or_else(|| "HEAD".into()));
}

fn fetch(cmd: &mut CommandLine, opts: &FetchOptions) -> Result<()> {
    if opts.all && opts.remote.is_some() {
        return Err(invalid(OperationKind::Fetch, "all and remote are exclusive"));
    }
    cmd.flag_if(opts.all, "--all")
        .flag_if(opts.prune, "--prune")
        .flag_if(opts.tags, "--tags");
    if let Some(remote) = &opts.remote {
        cmd.positional(remote.clone());
    }
    Ok(())
}

fn pull(cmd: &mut CommandLine, opts: &PullOptions) -> Result<()> {
    if opts.branch.is_some() && opts.remote.is_none() {
        return Err(invalid(OperationKind::Pull, "branch requires remote"));
    }
    cmd.flag("--no-edit")
        .flag(if opts.rebase { "--rebase" } else { "--no-rebase" })
        .flag_if(opts.ff_only, "--ff-only");
    if let Some(remote) = &opts.remote {
        cmd.positional(remote.clone());
    }
    if let Some(branch) = &opts.branch {
        cmd.positional(branch.clone());
    }
    Ok(())
}

fn push(cmd: &mut CommandLine, opts: &PushOptions) -> Result<()> {
    if opts.branch.is_some() && opts.remote.is_none() {
        return Err(invalid(OperationKind::Push, "branch requires remote"));
    }
    cmd.flag_if(opts.set_upstream, "--set-upstream")
        .flag_if(opts.force_with_lease, "--force-with-lease")
        .flag_if(opts.tags, "--tags");
    if let Some(remote) = &opts.remote {
        cmd.positional(remote.clone());
    }
    if let Some(branch) = &opts.branch {
        cmd.positional(branch.clone());
    }
    Ok(())
}

fn clean(cmd: &mut CommandLine, opts: &CleanOptions) {
    cmd.flag(if opts.dry_run { "-n" } else { "-f" })
        .flag_if(opts.directories, "-d")
        .flag_if(opts.ignored, "-x");
    cmd.pathspec(&opts.paths);
}

fn tag(cmd: &mut CommandLine, opts: &TagOptions) -> Result<()> {
    let kind = OperationKind::Tag;
    match opts {
        TagOptions::List { pattern } => {
            cmd.flag("--list");
            if let Some(pattern) = pattern {
                cmd.positional(pattern.clone());
            }
        }
        TagOptions::Create {
            name,
            target,
            message,
        } => {
            let name = required(kind, "name", name)?;
            if let Some(message) = message {
                cmd.flag("-a").option("-m", message.clone());
            }
            cmd.positional(name);
            if let Some(target) = target {
                cmd.positional(target.clone());
            }
        }
        TagOptions::Delete { name } => {
            let name = required(kind, "name", name)?;
            cmd.flag("-d").positional(name);
        }
    }
    Ok(())
}

fn remote(cmd: &mut CommandLine, opts: &RemoteOptions) -> Result<()> {
    let kind = OperationKind::Remote;
    match opts {
        RemoteOptions::List {} => {
            cmd.flag("-v");
        }
        RemoteOptions::Add { name, url } => {
            let name = required(kind, "name", name)?;
            let url = required(kind, "url", url)?;
            cmd.word("add").positional(name).positional(url);
        }
        RemoteOptions::Remove { name } => {
            let name = required(kind, "name", name)?;
            cmd.word("remove").positional(name);
        }
    }
    Ok(())
}

fn init(cmd: &mut CommandLine, opts: &InitOptions) -> Result<()> {
    cmd.flag_if(opts.bare, "--bare");
    if let Some(branch) = &opts.initial_branch {
        let branch = required(OperationKind::Init, "initial_branch", branch)?;
        cmd.flag("--initial-branch").positional(branch);
    }
    Ok(())
}
