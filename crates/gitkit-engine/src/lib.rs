//! Git operation execution engine
//!
//! Turns typed operation requests into validated `git` invocations, runs them
//! under a timeout and output cap, and returns parsed results or a
//! categorized [`Error`].

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod mapper;
pub mod operation;
pub mod output;
pub mod parse;
pub mod provider;

pub use command::{CommandLine, SigningMode};
pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use error::{Error, ErrorCategory, ErrorRecord, Result};
pub use exec::{ProcessResult, ProcessRunner, ProcessSpec, TokioProcessRunner};
pub use operation::{
    AddOptions, BranchOptions, CheckoutOptions, CleanOptions, CommitOptions, DiffOptions,
    FetchOptions, GitOperation, InitOptions, LogOptions, MergeOptions, OperationKind,
    PullOptions, PushOptions, ReflogOptions, RemoteOptions, ResetMode, ResetOptions,
    ShowOptions, StashOptions, StatusOptions, TagOptions, WorktreeOptions,
};
pub use output::{OperationOutput, TextOutput};
pub use provider::{CliGitProvider, GitProvider, OperationCapability, ProviderCapabilities};

pub use gitkit_session::{RequestContext, WorkingDirectoryStore};
