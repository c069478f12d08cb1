//! Storage backend trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keys::Namespace;
use crate::error::Result;

/// Which backend variant is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process maps; lost on exit.
    #[default]
    Memory,
    /// Remote key-value store with per-key TTL.
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// Outcome of a cascade removal.
///
/// Per-key failures do not fail the cascade; they are listed here and the
/// next removal pass retries them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Ids whose artifact and provenance entry were both removed.
    pub removed: Vec<String>,
    /// Raw keys that could not be read or deleted.
    pub failed: Vec<String>,
}

impl RemovalReport {
    /// True if every matching entry was removed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Artifact and provenance storage for one or more organizations.
///
/// Implementations must be thread-safe. Every method takes the namespace
/// so one backend instance can serve several tenants without their keys
/// ever meeting.
pub trait Backend: Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> BackendKind;

    /// Write the artifact and its provenance entry.
    fn put(&self, ns: &Namespace, id: &str, content: &str, template: &str) -> Result<()>;

    /// Read artifact content. `None` if absent or expired.
    fn get(&self, ns: &Namespace, id: &str) -> Result<Option<String>>;

    /// Read the recorded template name. `None` if absent or expired.
    fn provenance(&self, ns: &Namespace, id: &str) -> Result<Option<String>>;

    /// Delete one artifact and its provenance. Returns whether the artifact existed.
    fn delete(&self, ns: &Namespace, id: &str) -> Result<bool>;

    /// Delete every artifact (and provenance entry) recorded against `template`.
    fn remove_by_template(&self, ns: &Namespace, template: &str) -> Result<RemovalReport>;

    /// Ids of every artifact currently stored, sorted.
    fn ids(&self, ns: &Namespace) -> Result<Vec<String>>;
}
