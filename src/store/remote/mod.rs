//! Remote, TTL-based backend.
//!
//! Built on four key-value primitives ([`KvClient`]): get, set with TTL,
//! delete, and cursor-paginated scan by pattern. [`RedisKv`] provides them
//! over Redis; [`MockKv`] provides them in process for tests.
//!
//! # Consistency
//!
//! The remote store has no multi-key transaction, so an artifact and its
//! provenance entry are only *eventually together*:
//!
//! - `put` writes the artifact (content and TTL in one command) and then
//!   the provenance entry. If the second write fails the error is reported
//!   and nothing is rolled back; repeating the same `put` repairs the pair.
//! - A cascade deletes the artifact before its provenance entry, and only
//!   deletes the provenance entry once the artifact is gone, so a failed
//!   step never strands an artifact without provenance.
//! - TTL expiry is driven by the store. Provenance is written just after
//!   the artifact with the same TTL, so it may briefly outlive it; readers
//!   treat that as "not found".
//!
//! Template-scoped removal and listing scan the whole organization prefix,
//! one page of `scan_count` keys per round-trip, until the cursor returns
//! to `0`.

pub mod mock;
pub mod redis_kv;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::backend::{Backend, BackendKind, RemovalReport};
use super::keys::{KeyKind, Namespace};
use crate::error::{ConfcacheError, Result};

pub use self::mock::MockKv;
pub use self::redis_kv::RedisKv;

/// Default TTL for remote entries: three days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(259_200);

/// Default number of keys requested per scan round-trip.
pub const DEFAULT_SCAN_COUNT: usize = 100;

/// Cursor value that starts a scan and signals its completion.
pub const SCAN_DONE: u64 = 0;

/// Error from a key-value primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct KvError(pub String);

/// One page of scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; [`SCAN_DONE`] when the scan is complete.
    pub cursor: u64,
    /// Keys in this page. A key may appear in more than one page.
    pub keys: Vec<String>,
}

/// The primitives the remote backend needs from a key-value store.
pub trait KvClient: Send + Sync {
    /// Read a value. `Ok(None)` if the key is absent or expired.
    fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError>;

    /// Write a value that expires after `ttl`.
    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
        -> std::result::Result<(), KvError>;

    /// Delete a key. Returns whether it existed.
    fn delete(&self, key: &str) -> std::result::Result<bool, KvError>;

    /// Fetch the page of keys matching `pattern` after `cursor`.
    fn scan(&self, cursor: u64, pattern: &str, count: usize)
        -> std::result::Result<ScanPage, KvError>;
}

impl<C: KvClient + ?Sized> KvClient for Arc<C> {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> std::result::Result<(), KvError> {
        (**self).set_with_ttl(key, value, ttl)
    }

    fn delete(&self, key: &str) -> std::result::Result<bool, KvError> {
        (**self).delete(key)
    }

    fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> std::result::Result<ScanPage, KvError> {
        (**self).scan(cursor, pattern, count)
    }
}

/// Backend over a remote TTL key-value store.
#[derive(Debug)]
pub struct RemoteTtlBackend<C> {
    client: C,
    ttl: Duration,
    scan_count: usize,
}

impl<C: KvClient> RemoteTtlBackend<C> {
    /// Create a backend with the default TTL and scan page size.
    pub fn new(client: C) -> Self {
        Self {
            client,
            ttl: DEFAULT_TTL,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Set the TTL applied to every written key.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the number of keys requested per scan round-trip.
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count.max(1);
        self
    }

    /// The TTL applied to written keys.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Visit every key in the namespace, page by page.
    fn scan_namespace(&self, ns: &Namespace, mut visit: impl FnMut(&str)) -> Result<()> {
        let pattern = ns.scan_pattern();
        let mut cursor = SCAN_DONE;
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .scan(cursor, &pattern, self.scan_count)
                .map_err(|e| ConfcacheError::backend("scan", e))?;
            pages += 1;

            for key in &page.keys {
                visit(key);
            }

            if page.cursor == SCAN_DONE {
                break;
            }
            cursor = page.cursor;
        }

        tracing::debug!("Scanned {} in {} page(s)", pattern, pages);
        Ok(())
    }

    /// Delete the artifact, then its provenance entry.
    ///
    /// The provenance entry is kept if the artifact delete fails, so the
    /// pair can still be found and retried by the next cascade. An id is
    /// reported as removed only once both keys are gone.
    fn remove_pair(&self, ns: &Namespace, id: &str, report: &mut RemovalReport) {
        let artifact_key = ns.artifact_key(id);
        if let Err(e) = self.client.delete(&artifact_key) {
            tracing::warn!("Error deleting config key {}: {}", artifact_key, e);
            report.failed.push(artifact_key);
            return;
        }

        let provenance_key = ns.provenance_key(id);
        if let Err(e) = self.client.delete(&provenance_key) {
            tracing::warn!("Error deleting template key {}: {}", provenance_key, e);
            report.failed.push(provenance_key);
            return;
        }

        report.removed.push(id.to_string());
    }
}

impl<C: KvClient> Backend for RemoteTtlBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn put(&self, ns: &Namespace, id: &str, content: &str, template: &str) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(ConfcacheError::backend("set artifact", "TTL must be positive"));
        }

        self.client
            .set_with_ttl(&ns.artifact_key(id), content, self.ttl)
            .map_err(|e| ConfcacheError::backend("set artifact", e))?;

        self.client
            .set_with_ttl(&ns.provenance_key(id), template, self.ttl)
            .map_err(|e| ConfcacheError::backend("set provenance", e))
    }

    fn get(&self, ns: &Namespace, id: &str) -> Result<Option<String>> {
        self.client
            .get(&ns.artifact_key(id))
            .map_err(|e| ConfcacheError::backend("get artifact", e))
    }

    fn provenance(&self, ns: &Namespace, id: &str) -> Result<Option<String>> {
        self.client
            .get(&ns.provenance_key(id))
            .map_err(|e| ConfcacheError::backend("get provenance", e))
    }

    fn delete(&self, ns: &Namespace, id: &str) -> Result<bool> {
        let existed = self
            .client
            .delete(&ns.artifact_key(id))
            .map_err(|e| ConfcacheError::backend("delete artifact", e))?;
        self.client
            .delete(&ns.provenance_key(id))
            .map_err(|e| ConfcacheError::backend("delete provenance", e))?;
        Ok(existed)
    }

    fn remove_by_template(&self, ns: &Namespace, template: &str) -> Result<RemovalReport> {
        // Candidate ids are collected before anything is deleted.
        let mut candidates: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        self.scan_namespace(ns, |key| {
            if let Some(kind) = ns.classify(key) {
                let id = kind.id();
                if seen.insert(id.to_string()) {
                    candidates.push(id.to_string());
                }
            }
        })?;

        let mut report = RemovalReport::default();
        for id in candidates {
            // Artifact keys are checked through their companion provenance
            // key; provenance keys left behind by an expired artifact are
            // matched the same way and swept.
            let provenance_key = ns.provenance_key(&id);
            let recorded = match self.client.get(&provenance_key) {
                Ok(Some(recorded)) => recorded,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Error reading template key {}: {}", provenance_key, e);
                    report.failed.push(provenance_key);
                    continue;
                }
            };

            if recorded == template {
                self.remove_pair(ns, &id, &mut report);
            }
        }

        report.removed.sort();
        Ok(report)
    }

    fn ids(&self, ns: &Namespace) -> Result<Vec<String>> {
        let mut ids = BTreeSet::new();
        self.scan_namespace(ns, |key| {
            if let Some(KeyKind::Artifact(id)) = ns.classify(key) {
                ids.insert(id.to_string());
            }
        })?;
        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn backend() -> RemoteTtlBackend<MockKv> {
        RemoteTtlBackend::new(MockKv::new()).with_scan_count(2)
    }

    fn ns() -> Namespace {
        Namespace::new("acme")
    }

    #[test]
    fn put_writes_both_keys_with_ttl() {
        let backend = backend().with_ttl(Duration::from_secs(60));
        backend.put(&ns(), "cfg1", "hello", "a").unwrap();

        let kv = backend.client();
        assert_eq!(kv.raw_get("{acme}:cfg1").as_deref(), Some("hello"));
        assert_eq!(kv.raw_get("{acme}:template:cfg1").as_deref(), Some("a"));
        assert!(kv.ttl_of("{acme}:cfg1").is_some());
        assert!(kv.ttl_of("{acme}:template:cfg1").is_some());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let backend = backend().with_ttl(Duration::ZERO);
        let err = backend.put(&ns(), "cfg1", "hello", "a").unwrap_err();
        assert!(matches!(err, ConfcacheError::Backend { .. }));
        assert!(backend.client().is_empty());
    }

    #[test]
    fn provenance_write_failure_is_reported() {
        let backend = backend();
        backend.client().fail_sets_matching(":template:");

        let err = backend.put(&ns(), "cfg1", "hello", "a").unwrap_err();
        match err {
            ConfcacheError::Backend { operation, .. } => assert_eq!(operation, "set provenance"),
            other => panic!("unexpected error: {other}"),
        }

        // Retrying once the store recovers repairs the pair
        backend.client().clear_failures();
        backend.put(&ns(), "cfg1", "hello", "a").unwrap();
        assert_eq!(backend.provenance(&ns(), "cfg1").unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn remove_by_template_across_pages() {
        let backend = backend();
        for i in 0..7 {
            let template = if i % 2 == 0 { "a" } else { "b" };
            backend.put(&ns(), &format!("cfg{i}"), "x", template).unwrap();
        }

        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["cfg0", "cfg2", "cfg4", "cfg6"]);
        assert!(report.is_complete());
        assert_eq!(backend.ids(&ns()).unwrap(), vec!["cfg1", "cfg3", "cfg5"]);
        assert!(backend.provenance(&ns(), "cfg0").unwrap().is_none());
    }

    #[test]
    fn remove_by_template_sweeps_orphaned_provenance() {
        let backend = backend();
        backend
            .client()
            .raw_set("{acme}:template:gone", "a", Some(Duration::from_secs(60)));

        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["gone"]);
        assert!(backend.client().raw_get("{acme}:template:gone").is_none());
    }

    #[test]
    fn delete_failure_is_skipped_and_reported() {
        let backend = backend();
        backend.put(&ns(), "cfg1", "x", "a").unwrap();
        backend.put(&ns(), "cfg2", "x", "a").unwrap();
        backend.client().fail_deletes_matching("{acme}:cfg1");

        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["cfg2"]);
        assert_eq!(report.failed, vec!["{acme}:cfg1".to_string()]);

        // The surviving artifact keeps its provenance
        assert_eq!(backend.provenance(&ns(), "cfg1").unwrap().as_deref(), Some("a"));

        backend.client().clear_failures();
        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["cfg1"]);
    }

    #[test]
    fn provenance_delete_failure_is_not_counted_as_removed() {
        let backend = backend();
        backend.put(&ns(), "cfg1", "x", "a").unwrap();
        backend.put(&ns(), "cfg2", "x", "a").unwrap();
        backend.client().fail_deletes_matching("{acme}:template:cfg1");

        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["cfg2"]);
        assert_eq!(report.failed, vec!["{acme}:template:cfg1".to_string()]);
        assert!(!report.is_complete());

        // The artifact is gone but its provenance is left for the next pass
        assert!(backend.get(&ns(), "cfg1").unwrap().is_none());
        assert!(backend.client().raw_get("{acme}:template:cfg1").is_some());

        backend.client().clear_failures();
        let report = backend.remove_by_template(&ns(), "a").unwrap();
        assert_eq!(report.removed, vec!["cfg1"]);
        assert!(report.is_complete());
        assert!(backend.client().raw_get("{acme}:template:cfg1").is_none());
    }

    #[test]
    fn scan_failure_fails_cascade() {
        let backend = backend();
        backend.put(&ns(), "cfg1", "x", "a").unwrap();
        backend.client().fail_scans(true);

        let err = backend.remove_by_template(&ns(), "a").unwrap_err();
        assert!(matches!(err, ConfcacheError::Backend { ref operation, .. } if operation == "scan"));
        assert!(backend.get(&ns(), "cfg1").unwrap().is_some());
    }

    #[test]
    fn ids_exclude_provenance_and_other_orgs() {
        let backend = backend();
        backend.put(&ns(), "cfg1", "x", "a").unwrap();
        backend.put(&Namespace::new("globex"), "cfg2", "x", "a").unwrap();

        assert_eq!(backend.ids(&ns()).unwrap(), vec!["cfg1"]);
    }

    #[test]
    fn expired_artifact_is_absent() {
        let backend = backend().with_ttl(Duration::from_millis(50));
        backend.put(&ns(), "cfg3", "y", "unknown").unwrap();
        thread::sleep(Duration::from_millis(120));

        assert!(backend.get(&ns(), "cfg3").unwrap().is_none());
        assert!(backend.ids(&ns()).unwrap().is_empty());
    }

    #[test]
    fn scan_count_has_floor_of_one() {
        let backend = RemoteTtlBackend::new(MockKv::new()).with_scan_count(0);
        backend.put(&ns(), "cfg1", "x", "a").unwrap();
        assert_eq!(backend.ids(&ns()).unwrap(), vec!["cfg1"]);
    }
}
