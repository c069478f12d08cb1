//! Artifact cache with provenance tracking.
//!
//! Every cached artifact records the name of the template that rendered
//! it, so removing a template can cascade into removing everything it
//! produced. Two interchangeable backends implement [`Backend`]:
//!
//! - [`InMemoryBackend`]: process-local maps under one mutex; cascades are
//!   atomic to readers.
//! - [`RemoteTtlBackend`]: a remote key-value store with per-key TTL; an
//!   artifact and its provenance are only eventually together.
//!
//! [`ConfigStore`] is the organization-scoped façade callers use.

pub mod backend;
pub mod config_store;
pub mod keys;
pub mod memory;
pub mod provenance;
pub mod remote;

pub use backend::{Backend, BackendKind, RemovalReport};
pub use config_store::{ConfigStore, UNKNOWN_TEMPLATE};
pub use keys::{validate_id, KeyKind, Namespace, PROVENANCE_SEGMENT};
pub use memory::InMemoryBackend;
pub use provenance::ProvenanceIndex;
pub use remote::{
    KvClient, KvError, MockKv, RedisKv, RemoteTtlBackend, ScanPage, DEFAULT_SCAN_COUNT,
    DEFAULT_TTL, SCAN_DONE,
};
