//! Provider backed by the `git` command-line program

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use gitkit_session::{WorkingDirectoryStore, validate_working_directory};
use tracing::Instrument;

use super::{GitProvider, ProviderCapabilities};
use crate::command::{self, SigningMode};
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::exec::{ProcessRunner, ProcessSpec, TokioProcessRunner, non_interactive_env};
use crate::mapper::map_failure;
use crate::operation::GitOperation;
use crate::output::OperationOutput;
use crate::{Error, Result};

/// Runs each operation as one `git` process.
pub struct CliGitProvider {
    config: EngineConfig,
    runner: Arc<dyn ProcessRunner>,
    store: Arc<WorkingDirectoryStore>,
}

impl CliGitProvider {
    /// Provider with the tokio runner and a fresh working-directory store.
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(WorkingDirectoryStore::new(config.session_ttl()));
        Self::with_parts(config, Arc::new(TokioProcessRunner), store)
    }

    pub fn with_parts(
        config: EngineConfig,
        runner: Arc<dyn ProcessRunner>,
        store: Arc<WorkingDirectoryStore>,
    ) -> Self {
        Self {
            config,
            runner,
            store,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<WorkingDirectoryStore> {
        &self.store
    }

    /// The call's explicit path, else the session's stored one.
    fn resolve_working_directory(&self, ctx: &ExecutionContext) -> Result<PathBuf> {
        let path = match &ctx.working_directory {
            Some(path) => path.clone(),
            None => {
                let session = ctx.session_id().ok_or_else(|| Error::MissingWorkingDirectory {
                    session: "<none>".to_string(),
                })?;
                self.store
                    .get(ctx.tenant_id(), session, &ctx.request)
                    .ok_or_else(|| Error::MissingWorkingDirectory {
                        session: session.to_string(),
                    })?
            }
        };

        let path = validate_working_directory(&path.to_string_lossy())?;
        if !path.is_dir() {
            return Err(Error::WorkingDirectoryNotFound { path });
        }
        Ok(path)
    }

    fn process_spec(&self, cwd: &Path, args: Vec<String>) -> ProcessSpec {
        let mut env = non_interactive_env();
        env.extend(self.config.env.clone());
        ProcessSpec {
            program: self.config.git_binary.clone(),
            args,
            cwd: cwd.to_path_buf(),
            env,
            timeout: self.config.timeout(),
            max_buffer_bytes: self.config.max_buffer_bytes,
        }
    }

    /// Build, validate, run and interpret one attempt.
    async fn attempt(
        &self,
        operation: &GitOperation,
        cwd: &Path,
        signing: SigningMode,
    ) -> Result<OperationOutput> {
        let command = command::build(operation, signing)?;
        command::validate(&command)?;
        tracing::debug!(command = %command, cwd = %cwd.display(), "Running git");

        let spec = self.process_spec(cwd, command.argv());
        let result = self.runner.run(&spec).await?;

        if result.success() {
            OperationOutput::parse(operation, &result)
        } else {
            let error = map_failure(operation.kind(), &spec, &result);
            tracing::debug!(code = error.code(), exit_code = ?result.exit_code, "git failed");
            Err(error)
        }
    }

    async fn run_operation(
        &self,
        operation: GitOperation,
        ctx: &ExecutionContext,
    ) -> Result<OperationOutput> {
        let cwd = self.resolve_working_directory(ctx)?;

        let signing = if self.config.commit_signing && operation.creates_commit() {
            SigningMode::Sign
        } else {
            SigningMode::Inherit
        };

        match self.attempt(&operation, &cwd, signing).await {
            Err(Error::SigningFailed { operation: name, stderr }) if signing == SigningMode::Sign => {
                tracing::warn!(
                    operation = %name,
                    "Commit signing failed, retrying once without signing"
                );
                self.attempt(&operation, &cwd, SigningMode::NoSign)
                    .await
                    .map_err(|retry_error| Error::SigningRetryExhausted {
                        operation: name,
                        signed_stderr: stderr,
                        source: Box::new(retry_error),
                    })
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for CliGitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliGitProvider")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GitProvider for CliGitProvider {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::all_operations("git-cli", self.config.commit_signing)
    }

    async fn execute(
        &self,
        operation: GitOperation,
        ctx: &ExecutionContext,
    ) -> Result<OperationOutput> {
        let span = tracing::info_span!(
            "git_operation",
            operation = operation.name(),
            tenant = %ctx.tenant_id(),
            trace_id = %ctx.request.trace_id,
        );

        async {
            let result = self.run_operation(operation, ctx).await;
            match &result {
                Ok(output) => tracing::info!(output = output.kind(), "Operation succeeded"),
                Err(e) => tracing::info!(
                    category = %e.category(),
                    code = e.code(),
                    "Operation failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}
