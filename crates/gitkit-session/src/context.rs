//! Per-request identifiers

use serde::{Deserialize, Serialize};

/// Tenant id used when the caller does not supply one.
pub const DEFAULT_TENANT: &str = "default";

/// Identifiers attached to a single call into the engine.
///
/// The trace id is generated when not supplied so that every log line of a
/// call can be correlated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub tenant_id: String,
    pub session_id: Option<String>,
    pub trace_id: String,
}

impl RequestContext {
    /// Context for the default tenant with a fresh trace id.
    pub fn new() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT.to_string(),
            session_id: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Build a context from optional caller-supplied ids.
    pub fn from_parts(
        tenant_id: Option<&str>,
        session_id: Option<&str>,
        trace_id: Option<&str>,
    ) -> Self {
        let tenant_id = tenant_id
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TENANT)
            .to_string();
        Self {
            tenant_id,
            session_id: session_id.map(str::to_string),
            trace_id: trace_id
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_defaults_tenant() {
        let ctx = RequestContext::from_parts(None, Some("s1"), None);
        assert_eq!(ctx.tenant_id, DEFAULT_TENANT);
        assert_eq!(ctx.session_id.as_deref(), Some("s1"));
        assert!(!ctx.trace_id.is_empty());
    }

    #[test]
    fn test_from_parts_blank_tenant_is_default() {
        let ctx = RequestContext::from_parts(Some("  "), None, Some("trace-1"));
        assert_eq!(ctx.tenant_id, DEFAULT_TENANT);
        assert_eq!(ctx.trace_id, "trace-1");
    }
}
