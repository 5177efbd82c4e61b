//! Working-directory sessions for gitkit
//!
//! Associates a logical session (scoped to a tenant) with the filesystem path
//! that git operations default to when a request omits one.
//!
//! - [`WorkingDirectoryStore`]: tenant-isolated key-value store with lazy TTL eviction
//! - [`Clock`]: time source, swappable for deterministic expiry in tests
//! - [`RequestContext`]: tenant/session/trace identifiers carried by every call

pub mod clock;
pub mod context;
pub mod error;
pub mod path;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{DEFAULT_TENANT, RequestContext};
pub use error::{Error, Result};
pub use path::{has_traversal, validate_working_directory};
pub use store::{WorkingDirectoryEntry, WorkingDirectoryStore};
