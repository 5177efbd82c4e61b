//! Tenant-scoped working-directory store with lazy TTL eviction

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::context::{DEFAULT_TENANT, RequestContext};
use crate::path::validate_working_directory;
use crate::{Error, Result};

/// A stored association between a session and a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectoryEntry {
    pub tenant_id: String,
    pub session_id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// `None` means the entry never expires
    pub ttl: Option<Duration>,
}

impl WorkingDirectoryEntry {
    /// Instant after which the entry is no longer live.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.ttl?).ok()?;
        self.created_at.checked_add_signed(ttl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoreKey {
    tenant: String,
    session: String,
}

impl StoreKey {
    fn new(tenant: &str, session: &str) -> Self {
        Self {
            tenant: normalize_tenant(tenant).to_string(),
            session: session.to_string(),
        }
    }
}

fn normalize_tenant(tenant: &str) -> &str {
    let trimmed = tenant.trim();
    if trimmed.is_empty() {
        DEFAULT_TENANT
    } else {
        trimmed
    }
}

/// In-memory working-directory store.
///
/// Keys are `(tenant, session)` pairs; a session id under one tenant is never
/// visible under another. Expired entries are dropped when a read or a list
/// encounters them, there is no background sweep. Concurrent `set` calls on
/// the same key are last-write-wins.
pub struct WorkingDirectoryStore {
    entries: Mutex<HashMap<StoreKey, WorkingDirectoryEntry>>,
    clock: Arc<dyn Clock>,
    default_ttl: Option<Duration>,
}

impl WorkingDirectoryStore {
    /// Create a store on the system clock.
    ///
    /// `default_ttl` applies to `set` calls that pass no TTL of their own.
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<StoreKey, WorkingDirectoryEntry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Associate `session` under `tenant` with `path`.
    ///
    /// The path must be absolute and traversal-free. An existing entry for the
    /// same key is replaced.
    pub fn set(
        &self,
        tenant: &str,
        session: &str,
        path: &str,
        ttl: Option<Duration>,
        ctx: &RequestContext,
    ) -> Result<()> {
        if session.is_empty() {
            return Err(Error::EmptyKey);
        }
        let path = validate_working_directory(path)?;
        let key = StoreKey::new(tenant, session);
        let entry = WorkingDirectoryEntry {
            tenant_id: key.tenant.clone(),
            session_id: key.session.clone(),
            path,
            created_at: self.clock.now(),
            ttl: ttl.or(self.default_ttl),
        };

        tracing::debug!(
            tenant = %entry.tenant_id,
            session = %entry.session_id,
            path = %entry.path.display(),
            ttl_ms = entry.ttl.map(|t| t.as_millis() as u64),
            trace_id = %ctx.trace_id,
            "Set working directory"
        );

        self.lock().insert(key, entry);
        Ok(())
    }

    /// Look up the live working directory for `session` under `tenant`.
    pub fn get(&self, tenant: &str, session: &str, ctx: &RequestContext) -> Option<PathBuf> {
        self.entry(tenant, session, ctx).map(|entry| entry.path)
    }

    /// Like [`get`](Self::get) but returns the whole entry.
    pub fn entry(
        &self,
        tenant: &str,
        session: &str,
        ctx: &RequestContext,
    ) -> Option<WorkingDirectoryEntry> {
        let key = StoreKey::new(tenant, session);
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = entries.get(&key)?.is_expired(now);
        if expired {
            entries.remove(&key);
            tracing::debug!(
                tenant = %key.tenant,
                session = %key.session,
                trace_id = %ctx.trace_id,
                "Evicted expired working directory"
            );
            return None;
        }

        entries.get(&key).cloned()
    }

    /// List the live session keys under `tenant` that start with `prefix`.
    ///
    /// Expired entries met during the scan are removed. Keys are returned
    /// sorted.
    pub fn list(&self, tenant: &str, prefix: &str, ctx: &RequestContext) -> Vec<String> {
        let tenant = normalize_tenant(tenant);
        let now = self.clock.now();
        let mut entries = self.lock();

        let mut evicted = 0usize;
        entries.retain(|key, entry| {
            if key.tenant == tenant && key.session.starts_with(prefix) && entry.is_expired(now) {
                evicted += 1;
                false
            } else {
                true
            }
        });

        if evicted > 0 {
            tracing::debug!(
                tenant = %tenant,
                evicted,
                trace_id = %ctx.trace_id,
                "Evicted expired working directories during list"
            );
        }

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.tenant == tenant && key.session.starts_with(prefix))
            .map(|key| key.session.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Remove the entry for `session` under `tenant`.
    ///
    /// Returns whether an entry (live or expired) was present.
    pub fn delete(&self, tenant: &str, session: &str, ctx: &RequestContext) -> bool {
        let key = StoreKey::new(tenant, session);
        let removed = self.lock().remove(&key).is_some();
        tracing::debug!(
            tenant = %key.tenant,
            session = %key.session,
            removed,
            trace_id = %ctx.trace_id,
            "Cleared working directory"
        );
        removed
    }

    /// Number of stored entries, including any not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WorkingDirectoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for WorkingDirectoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingDirectoryStore")
            .field("entries", &self.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
