//! Environment variable overrides.
//!
//! Variable names are shared with existing deployments:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `ORG_NAME` | `organization` |
//! | `USE_REDIS` | `storage.backend` (`true` selects remote) |
//! | `REDIS_URL` | `storage.url` |
//! | `REDIS_TTL` | `storage.ttl` (integer seconds) |
//! | `CONFCACHE_TEMPLATE_DIR` | `templates.directory` |
//! | `CONFCACHE_RELOAD_INTERVAL` | `reload.interval` |

use std::collections::HashMap;
use std::path::PathBuf;

use super::schema::Settings;
use crate::error::{ConfcacheError, Result};
use crate::store::BackendKind;

/// Snapshot the process environment.
pub fn load_system_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Apply overrides from `env` onto `settings`.
///
/// Empty values are ignored.
pub fn apply_env(settings: &mut Settings, env: &HashMap<String, String>) -> Result<()> {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(org) = get("ORG_NAME") {
        settings.organization = org.to_string();
    }

    if let Some(flag) = get("USE_REDIS") {
        settings.storage.backend = match flag.to_lowercase().as_str() {
            "true" | "1" | "yes" => BackendKind::Remote,
            "false" | "0" | "no" => BackendKind::Memory,
            other => {
                return Err(ConfcacheError::ConfigValidationError {
                    message: format!("USE_REDIS must be true or false, got '{}'", other),
                })
            }
        };
    }

    if let Some(url) = get("REDIS_URL") {
        settings.storage.url = Some(url.to_string());
    }

    if let Some(ttl) = get("REDIS_TTL") {
        let secs: u64 = ttl
            .parse()
            .map_err(|_| ConfcacheError::ConfigValidationError {
                message: format!("REDIS_TTL must be a number of seconds, got '{}'", ttl),
            })?;
        settings.storage.ttl = Some(secs.to_string());
    }

    if let Some(dir) = get("CONFCACHE_TEMPLATE_DIR") {
        settings.templates.directory = PathBuf::from(dir);
    }

    if let Some(interval) = get("CONFCACHE_RELOAD_INTERVAL") {
        settings.reload.interval = interval.to_string();
    }

    Ok(())
}
