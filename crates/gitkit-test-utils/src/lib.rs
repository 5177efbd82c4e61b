//! Shared test utilities for the gitkit workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`git`]: run the `git` CLI and build repositories with history
//! - [`repo`]: [`TestRepo`](repo::TestRepo), a temporary repository with helpers

pub mod git;
pub mod repo;

pub use repo::TestRepo;
