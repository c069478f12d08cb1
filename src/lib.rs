//! confcache - render configuration files from templates and keep the
//! cache of rendered configs consistent with the template directory.
//!
//! Every rendered config is stored under an organization namespace together
//! with a provenance entry naming the template that produced it. When a
//! template disappears from disk, a reload removes it from the registry and
//! cascades the removal to every config it produced.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading, environment overrides, and validation
//! - [`error`] - Error types and result aliases
//! - [`reload`] - Reload coordinator and the watch/poll drivers
//! - [`render`] - Render-and-cache entry point
//! - [`store`] - Config store, key schema, and storage backends
//! - [`template`] - Template parsing and the live template registry
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use confcache::{ConfigRenderer, ConfigStore, ReloadCoordinator, TemplateRegistry};
//! use confcache::template::RenderContext;
//! use std::fs;
//! use std::sync::Arc;
//! use tempfile::TempDir;
//!
//! let dir = TempDir::new().unwrap();
//! fs::write(dir.path().join("nginx.conf.tmpl"), "listen ${port};").unwrap();
//!
//! let registry = Arc::new(TemplateRegistry::load(dir.path(), ".conf.tmpl").unwrap());
//! let store = ConfigStore::in_memory("acme");
//! let renderer = ConfigRenderer::new(registry.clone(), store.clone());
//!
//! let ctx = RenderContext::new().with("port", "8080");
//! assert_eq!(renderer.render("nginx", "web1", &ctx).unwrap(), "listen 8080;");
//! assert_eq!(store.get_template("web1").unwrap(), "nginx");
//!
//! // Deleting the template and reloading removes what it produced.
//! fs::remove_file(dir.path().join("nginx.conf.tmpl")).unwrap();
//! let mut coordinator = ReloadCoordinator::new(registry, store.clone(), dir.path());
//! coordinator.run_cycle().unwrap();
//! assert!(store.get("web1").is_err());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod reload;
pub mod render;
pub mod store;
pub mod template;
pub mod ui;

pub use error::{ConfcacheError, Result};
pub use reload::ReloadCoordinator;
pub use render::ConfigRenderer;
pub use store::ConfigStore;
pub use template::TemplateRegistry;
