//! Per-call execution context

use std::path::PathBuf;

use gitkit_session::RequestContext;

/// Context passed to the provider for each operation
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Repository path for this call; falls back to the session's stored
    /// working directory when absent
    pub working_directory: Option<PathBuf>,
    pub request: RequestContext,
}

impl ExecutionContext {
    pub fn new(request: RequestContext) -> Self {
        Self {
            working_directory: None,
            request,
        }
    }

    /// Context for a one-off call against `path` under the default tenant
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self::new(RequestContext::new()).with_working_directory(path)
    }

    pub fn with_working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.request.tenant_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.request.session_id.as_deref()
    }
}
