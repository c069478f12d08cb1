//! In-process backend.
//!
//! Artifacts and provenance share one mutex, so a cascade removal sees a
//! consistent key → template snapshot and deletes from both maps before
//! any reader can observe either. Removal is immediately visible: a `get`
//! issued after `remove_by_template` returns always misses.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::backend::{Backend, BackendKind, RemovalReport};
use super::keys::{KeyKind, Namespace};
use super::provenance::ProvenanceIndex;
use crate::error::Result;

#[derive(Debug, Default)]
struct MemoryState {
    artifacts: HashMap<String, String>,
    provenance: ProvenanceIndex,
}

/// Backend holding everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total artifacts across all organizations.
    pub fn len(&self) -> usize {
        self.lock().artifacts.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Backend for InMemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn put(&self, ns: &Namespace, id: &str, content: &str, template: &str) -> Result<()> {
        let key = ns.artifact_key(id);
        let mut state = self.lock();
        state.artifacts.insert(key.clone(), content.to_string());
        state.provenance.record(key, template);
        Ok(())
    }

    fn get(&self, ns: &Namespace, id: &str) -> Result<Option<String>> {
        Ok(self.lock().artifacts.get(&ns.artifact_key(id)).cloned())
    }

    fn provenance(&self, ns: &Namespace, id: &str) -> Result<Option<String>> {
        Ok(self
            .lock()
            .provenance
            .template_of(&ns.artifact_key(id))
            .map(str::to_string))
    }

    fn delete(&self, ns: &Namespace, id: &str) -> Result<bool> {
        let key = ns.artifact_key(id);
        let mut state = self.lock();
        state.provenance.forget(&key);
        Ok(state.artifacts.remove(&key).is_some())
    }

    fn remove_by_template(&self, ns: &Namespace, template: &str) -> Result<RemovalReport> {
        let mut state = self.lock();
        let keys = state.provenance.keys_for_template(ns, template);

        let mut report = RemovalReport::default();
        for key in keys {
            state.artifacts.remove(&key);
            state.provenance.forget(&key);
            if let Some(kind) = ns.classify(&key) {
                report.removed.push(kind.id().to_string());
            }
        }
        report.removed.sort();
        Ok(report)
    }

    fn ids(&self, ns: &Namespace) -> Result<Vec<String>> {
        let state = self.lock();
        let mut ids: Vec<String> = state
            .artifacts
            .keys()
            .filter_map(|key| match ns.classify(key) {
                Some(KeyKind::Artifact(id)) => Some(id.to_string()),
                _ => None,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}
