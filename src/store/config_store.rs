//! Cache-facing API for one organization.

use std::sync::Arc;

use super::backend::{Backend, BackendKind, RemovalReport};
use super::keys::{validate_id, Namespace};
use super::memory::InMemoryBackend;
use super::remote::{RedisKv, RemoteTtlBackend};
use crate::config::Settings;
use crate::error::{ConfcacheError, Result};

/// Template name recorded when the caller does not supply one.
pub const UNKNOWN_TEMPLATE: &str = "unknown";

/// Artifact cache with provenance tracking, scoped to one organization.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct ConfigStore {
    namespace: Namespace,
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("organization", &self.namespace.organization())
            .field("backend", &self.backend.kind())
            .finish()
    }
}

impl ConfigStore {
    /// Create a store for `organization` over `backend`.
    pub fn new(organization: impl Into<String>, backend: Arc<dyn Backend>) -> Self {
        Self {
            namespace: Namespace::new(organization),
            backend,
        }
    }

    /// Create a store over a fresh in-process backend.
    pub fn in_memory(organization: impl Into<String>) -> Self {
        Self::new(organization, Arc::new(InMemoryBackend::new()))
    }

    /// Build the store described by `settings`.
    ///
    /// The remote backend connects immediately; an unreachable server is
    /// a `Backend` error.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let backend: Arc<dyn Backend> = match settings.storage.backend {
            BackendKind::Memory => Arc::new(InMemoryBackend::new()),
            BackendKind::Remote => {
                let url = settings.storage.url.as_deref().ok_or_else(|| {
                    ConfcacheError::ConfigValidationError {
                        message: "storage.url is required for the remote backend".to_string(),
                    }
                })?;
                let client =
                    RedisKv::connect(url).map_err(|e| ConfcacheError::backend("connect", e))?;
                Arc::new(
                    RemoteTtlBackend::new(client)
                        .with_ttl(settings.ttl()?)
                        .with_scan_count(settings.storage.scan_count),
                )
            }
        };

        tracing::debug!(
            "Using {} backend for organization {}",
            backend.kind(),
            settings.organization
        );
        Ok(Self::new(settings.organization.clone(), backend))
    }

    /// The organization this store is scoped to.
    pub fn organization(&self) -> &str {
        self.namespace.organization()
    }

    /// The key schema for this organization.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Which backend variant is in use.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Cache `content` under `id`, recording `template` as its producer.
    ///
    /// Retry-safe: repeating the call with the same arguments repairs a
    /// partially persisted pair on the remote backend.
    pub fn set_with_template(&self, id: &str, content: &str, template: &str) -> Result<()> {
        validate_id(id)?;
        self.backend.put(&self.namespace, id, content, template)
    }

    /// Cache `content` under `id` with provenance [`UNKNOWN_TEMPLATE`].
    pub fn set(&self, id: &str, content: &str) -> Result<()> {
        self.set_with_template(id, content, UNKNOWN_TEMPLATE)
    }

    /// Cached content for `id`.
    pub fn get(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        self.backend
            .get(&self.namespace, id)?
            .ok_or_else(|| ConfcacheError::NotFound { id: id.to_string() })
    }

    /// Name of the template that produced `id`.
    ///
    /// A provenance entry whose artifact has already expired counts as
    /// missing.
    pub fn get_template(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        let not_found = || ConfcacheError::ProvenanceNotFound { id: id.to_string() };

        let template = self.backend.provenance(&self.namespace, id)?.ok_or_else(not_found)?;
        if self.backend.get(&self.namespace, id)?.is_none() {
            return Err(not_found());
        }
        Ok(template)
    }

    /// Remove every artifact produced by `template`.
    ///
    /// Per-key failures are logged and left for the next pass; only a
    /// failed scan is an error.
    pub fn remove_by_template(&self, template: &str) -> Result<()> {
        self.cascade(template).map(|_| ())
    }

    /// Like [`remove_by_template`](Self::remove_by_template), returning the
    /// per-key outcome.
    pub fn cascade(&self, template: &str) -> Result<RemovalReport> {
        let report = self.backend.remove_by_template(&self.namespace, template)?;

        if !report.removed.is_empty() {
            tracing::info!(
                "Removed {} config(s) rendered from template {}",
                report.removed.len(),
                template
            );
        }
        if !report.is_complete() {
            tracing::warn!(
                "{} key(s) for template {} could not be removed and will be retried",
                report.failed.len(),
                template
            );
        }
        Ok(report)
    }

    /// Ids of every cached artifact, sorted.
    pub fn get_all(&self) -> Result<Vec<String>> {
        self.backend.ids(&self.namespace)
    }

    /// Delete one artifact and its provenance. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        self.backend.delete(&self.namespace, id)
    }
}
