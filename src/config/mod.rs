//! Configuration loading, parsing, and validation for confcache.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Environment overrides in [`environment`]
//! - Validation in [`validator`]
//! - Human-readable durations in [`duration`]
//!
//! # Example
//!
//! ```
//! use confcache::config::{load_settings, validate};
//! use std::collections::HashMap;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("confcache.yml"), "organization: acme").unwrap();
//!
//! let settings = load_settings(temp.path(), None, &HashMap::new()).unwrap();
//! validate(&settings).unwrap();
//! assert_eq!(settings.organization, "acme");
//! ```

pub mod duration;
pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

pub use duration::{format_duration, parse_ttl};
pub use environment::{apply_env, load_system_env};
pub use loader::{
    discover_config, load_config_file, load_settings, parse_config, DEFAULT_CONFIG_FILE,
};
pub use schema::{ReloadSettings, Settings, StorageSettings, TemplateSettings};
pub use validator::{validate, validate_settings, ValidationError};
