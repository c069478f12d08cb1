//! Settings and services shared by every command.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::cli::args::Cli;
use crate::config::{load_settings, validate, Settings};
use crate::error::Result;
use crate::store::ConfigStore;
use crate::template::TemplateRegistry;

/// Resolved configuration for one CLI invocation.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
}

impl AppContext {
    /// Wrap already-resolved settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Layer defaults, config file, `env` and CLI flags, then validate.
    pub fn resolve(cli: &Cli, cwd: &Path, env: &HashMap<String, String>) -> Result<Self> {
        let mut settings = load_settings(cwd, cli.config.as_deref(), env)?;

        if let Some(org) = &cli.org {
            settings.organization = org.clone();
        }
        if let Some(dir) = &cli.templates {
            settings.templates.directory = dir.clone();
        }
        if settings.templates.directory.is_relative() {
            settings.templates.directory = cwd.join(&settings.templates.directory);
        }

        validate(&settings)?;
        Ok(Self { settings })
    }

    /// The effective settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the template registry from the configured directory.
    pub fn load_registry(&self) -> Result<Arc<TemplateRegistry>> {
        let templates = &self.settings.templates;
        let registry = TemplateRegistry::load(&templates.directory, templates.suffix.clone())?;
        tracing::debug!(
            "Loaded {} template(s) from {}",
            registry.len(),
            templates.directory.display()
        );
        Ok(Arc::new(registry))
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<ConfigStore> {
        ConfigStore::from_settings(&self.settings)
    }
}
