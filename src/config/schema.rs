//! Configuration schema.
//!
//! A `confcache.yml` file looks like:
//!
//! ```yaml
//! organization: acme
//! templates:
//!   directory: conf
//!   suffix: .conf.tmpl
//! storage:
//!   backend: remote
//!   url: redis://127.0.0.1:6379/
//!   ttl: 3d
//!   scan_count: 100
//! reload:
//!   mode: poll
//!   interval: 30s
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::duration::parse_ttl;
use crate::error::{ConfcacheError, Result};
use crate::reload::ReloadMode;
use crate::store::{BackendKind, DEFAULT_SCAN_COUNT, DEFAULT_TTL};
use crate::template::DEFAULT_SUFFIX;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tenant namespace for every cached key
    pub organization: String,

    /// Where templates are loaded from
    pub templates: TemplateSettings,

    /// Which backend caches artifacts
    pub storage: StorageSettings,

    /// How template changes are picked up
    pub reload: ReloadSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            templates: TemplateSettings::default(),
            storage: StorageSettings::default(),
            reload: ReloadSettings::default(),
        }
    }
}

impl Settings {
    /// Effective TTL for remote entries.
    pub fn ttl(&self) -> Result<Duration> {
        match &self.storage.ttl {
            Some(ttl) => parse_ttl(ttl).map_err(|e| ConfcacheError::ConfigValidationError {
                message: format!("storage.ttl: {:#}", e),
            }),
            None => Ok(DEFAULT_TTL),
        }
    }

    /// Effective poll interval.
    pub fn reload_interval(&self) -> Result<Duration> {
        parse_ttl(&self.reload.interval).map_err(|e| ConfcacheError::ConfigValidationError {
            message: format!("reload.interval: {:#}", e),
        })
    }
}

fn default_organization() -> String {
    "default".to_string()
}

/// Template directory settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory scanned for templates
    pub directory: PathBuf,

    /// File suffix that marks a template
    pub suffix: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("conf"),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend variant: memory or remote
    pub backend: BackendKind,

    /// Connection URL for the remote backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// TTL for remote entries ("3d", "24h", or seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    /// Keys requested per scan round-trip
    pub scan_count: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            url: None,
            ttl: None,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }
}

/// Reload driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadSettings {
    /// Driver: watch, poll or off
    pub mode: ReloadMode,

    /// Poll interval ("30s", "5m")
    pub interval: String,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            mode: ReloadMode::Watch,
            interval: "30s".to_string(),
        }
    }
}
