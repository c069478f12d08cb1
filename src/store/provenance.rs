//! Provenance index for the in-process backend.
//!
//! Maps an artifact key to the name of the template that produced it. The
//! index lives next to the artifact map under the same lock; it is never
//! updated on its own.

use std::collections::HashMap;

use super::keys::{KeyKind, Namespace};

/// Artifact key → template name.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceIndex {
    entries: HashMap<String, String>,
}

impl ProvenanceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the template for an artifact key.
    pub fn record(&mut self, artifact_key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(artifact_key.into(), template.into());
    }

    /// Template recorded for an artifact key.
    pub fn template_of(&self, artifact_key: &str) -> Option<&str> {
        self.entries.get(artifact_key).map(String::as_str)
    }

    /// Artifact keys in `ns` recorded against `template`.
    pub fn keys_for_template(&self, ns: &Namespace, template: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(key, recorded)| {
                recorded.as_str() == template
                    && matches!(ns.classify(key), Some(KeyKind::Artifact(_)))
            })
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Drop the entry for an artifact key.
    pub fn forget(&mut self, artifact_key: &str) -> Option<String> {
        self.entries.remove(artifact_key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
