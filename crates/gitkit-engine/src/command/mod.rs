//! Argument vectors for git operations
//!
//! [`build`] turns a [`GitOperation`](crate::GitOperation) into a
//! [`CommandLine`] of typed arguments; [`validate`] checks it before anything
//! is spawned. Arguments keep their provenance so the validator can apply the
//! right rule to each one:
//!
//! - [`Arg::Word`]: a subcommand word chosen by the engine (`stash`, `push`)
//! - [`Arg::Flag`]: chosen by the engine, checked against the allow-list
//! - [`Arg::Value`]: free text following a flag (commit message, date)
//! - [`Arg::Positional`]: caller-supplied ref, branch, remote or URL
//! - [`Arg::Path`]: caller-supplied path or pathspec

mod build;
mod validate;

pub use build::build;
pub use validate::{SHELL_METACHARACTERS, is_allowed_flag, validate, validate_argv};

use crate::operation::OperationKind;

/// Whether to request commit signing from git.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningMode {
    /// Emit nothing; git follows repository config
    #[default]
    Inherit,
    /// `-S`
    Sign,
    /// `--no-gpg-sign`
    NoSign,
}

/// One element of a git argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Word(String),
    Flag(String),
    Value(String),
    Positional(String),
    Path(String),
    /// `--`, ends option parsing
    Separator,
}

impl Arg {
    pub fn as_str(&self) -> &str {
        match self {
            Arg::Word(s) | Arg::Flag(s) | Arg::Value(s) | Arg::Positional(s) | Arg::Path(s) => s,
            Arg::Separator => "--",
        }
    }
}

/// The subcommand and arguments for one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub operation: OperationKind,
    pub args: Vec<Arg>,
}

impl CommandLine {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            args: Vec::new(),
        }
    }

    pub fn word(&mut self, word: &str) -> &mut Self {
        self.args.push(Arg::Word(word.to_string()));
        self
    }

    pub fn flag(&mut self, flag: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Flag(flag.into()));
        self
    }

    pub fn flag_if(&mut self, condition: bool, flag: &str) -> &mut Self {
        if condition {
            self.flag(flag);
        }
        self
    }

    /// A flag followed by a free-text value.
    pub fn option(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.flag(flag);
        self.args.push(Arg::Value(value.into()));
        self
    }

    pub fn positional(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Positional(value.into()));
        self
    }

    pub fn path(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(Arg::Path(value.into()));
        self
    }

    /// `--` followed by `paths`; nothing is emitted for an empty list.
    pub fn pathspec(&mut self, paths: &[String]) -> &mut Self {
        if !paths.is_empty() {
            self.args.push(Arg::Separator);
            self.args.extend(paths.iter().map(|p| Arg::Path(p.clone())));
        }
        self
    }

    pub fn signing(&mut self, mode: SigningMode) -> &mut Self {
        match mode {
            SigningMode::Inherit => self,
            SigningMode::Sign => self.flag("-S"),
            SigningMode::NoSign => self.flag("--no-gpg-sign"),
        }
    }

    /// The argument vector handed to the process executor.
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().map(|a| a.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("git")?;
        for arg in &self.args {
            write!(f, " {}", arg.as_str())?;
        }
        Ok(())
    }
}
