//! Configuration file discovery and loading.
//!
//! Settings are layered, later layers overriding earlier ones:
//! 1. Built-in defaults
//! 2. Config file (`--config`, else `confcache.yml` in the working directory)
//! 3. Environment variables (see [`apply_env`](super::environment::apply_env))
//! 4. Command-line flags, applied by the caller

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::environment::apply_env;
use super::schema::Settings;
use crate::error::{ConfcacheError, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "confcache.yml";

/// Find the config file to load.
///
/// An explicit path is returned as-is (and must exist when loaded);
/// otherwise `confcache.yml` under `cwd` is used if present.
pub fn discover_config(cwd: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let path = cwd.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfcacheError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfcacheError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into Settings.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(content).map_err(|e| ConfcacheError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load settings from defaults, the discovered file and `env`.
pub fn load_settings(
    cwd: &Path,
    explicit: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<Settings> {
    let mut settings = match discover_config(cwd, explicit) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => Settings::default(),
    };

    apply_env(&mut settings, env)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BackendKind;
    use tempfile::TempDir;

    #[test]
    fn discover_finds_default_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("confcache.yml"), "organization: acme").unwrap();

        let found = discover_config(temp.path(), None);
        assert_eq!(found, Some(temp.path().join("confcache.yml")));
    }

    #[test]
    fn discover_returns_none_without_file() {
        let temp = TempDir::new().unwrap();
        assert!(discover_config(temp.path(), None).is_none());
    }

    #[test]
    fn explicit_path_wins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("confcache.yml"), "").unwrap();
        let explicit = temp.path().join("other.yml");

        assert_eq!(
            discover_config(temp.path(), Some(&explicit)),
            Some(explicit.clone())
        );
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/confcache.yml"));
        assert!(matches!(result, Err(ConfcacheError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("organization: [", Path::new("test.yml"));
        assert!(matches!(result, Err(ConfcacheError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_is_defaults() {
        let settings = parse_config("\n", Path::new("test.yml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn env_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("confcache.yml"),
            "organization: from-file\nstorage:\n  backend: memory\n",
        )
        .unwrap();

        let env: HashMap<String, String> = [
            ("ORG_NAME".to_string(), "from-env".to_string()),
            ("USE_REDIS".to_string(), "true".to_string()),
        ]
        .into_iter()
        .collect();

        let settings = load_settings(temp.path(), None, &env).unwrap();
        assert_eq!(settings.organization, "from-env");
        assert_eq!(settings.storage.backend, BackendKind::Remote);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yml");
        let result = load_settings(temp.path(), Some(&missing), &HashMap::new());
        assert!(matches!(result, Err(ConfcacheError::ConfigNotFound { .. })));
    }
}
