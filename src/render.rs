//! Render-and-cache API.
//!
//! [`ConfigRenderer`] is what an application (for example an HTTP handler)
//! calls: it renders a template from the live registry and caches the
//! output with provenance in one step.

use std::sync::Arc;

use crate::error::{ConfcacheError, Result};
use crate::store::ConfigStore;
use crate::template::{RenderContext, TemplateRegistry};

/// Renders templates and caches the output.
#[derive(Debug, Clone)]
pub struct ConfigRenderer {
    registry: Arc<TemplateRegistry>,
    store: ConfigStore,
}

impl ConfigRenderer {
    /// Create a renderer over a registry and store.
    pub fn new(registry: Arc<TemplateRegistry>, store: ConfigStore) -> Self {
        Self { registry, store }
    }

    /// The template registry.
    pub fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    /// The artifact store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Render `template` with `context` and cache the result under `id`.
    ///
    /// If a reload removes the template while this call is writing, the
    /// artifact just written is deleted again so nothing outlives its
    /// template, and `UnknownTemplate` is returned.
    pub fn render(&self, template: &str, id: &str, context: &RenderContext) -> Result<String> {
        let loaded = self
            .registry
            .get(template)
            .ok_or_else(|| ConfcacheError::UnknownTemplate {
                name: template.to_string(),
            })?;

        let output = loaded.render(context)?;
        self.store.set_with_template(id, &output, template)?;

        if !self.registry.contains(template) {
            tracing::debug!(
                "Template {} was removed while rendering {}; discarding",
                template,
                id
            );
            self.store.delete(id)?;
            return Err(ConfcacheError::UnknownTemplate {
                name: template.to_string(),
            });
        }

        tracing::debug!("Rendered {} from template {}", id, template);
        Ok(output)
    }

    /// Return the cached artifact for `id`, rendering it on a miss.
    pub fn get_or_render(&self, id: &str, template: &str, context: &RenderContext) -> Result<String> {
        match self.store.get(id) {
            Ok(cached) => Ok(cached),
            Err(ConfcacheError::NotFound { .. }) => self.render(template, id, context),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn renderer() -> (TempDir, ConfigRenderer) {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("nginx.conf.tmpl"),
            "server_name ${host};\nlisten ${port};",
        )
        .unwrap();
        let registry = Arc::new(TemplateRegistry::load(temp.path(), ".conf.tmpl").unwrap());
        (temp, ConfigRenderer::new(registry, ConfigStore::in_memory("acme")))
    }

    fn ctx() -> RenderContext {
        RenderContext::new().with("host", "example.com").with("port", "80")
    }

    #[test]
    fn render_caches_with_provenance() {
        let (_temp, renderer) = renderer();
        let output = renderer.render("nginx", "web1", &ctx()).unwrap();

        assert_eq!(output, "server_name example.com;\nlisten 80;");
        assert_eq!(renderer.store().get("web1").unwrap(), output);
        assert_eq!(renderer.store().get_template("web1").unwrap(), "nginx");
    }

    #[test]
    fn unknown_template_is_error() {
        let (_temp, renderer) = renderer();
        assert!(matches!(
            renderer.render("haproxy", "lb1", &ctx()),
            Err(ConfcacheError::UnknownTemplate { .. })
        ));
        assert!(renderer.store().get("lb1").is_err());
    }

    #[test]
    fn missing_variable_caches_nothing() {
        let (_temp, renderer) = renderer();
        let partial = RenderContext::new().with("host", "example.com");
        assert!(matches!(
            renderer.render("nginx", "web1", &partial),
            Err(ConfcacheError::Render { .. })
        ));
        assert!(renderer.store().get("web1").is_err());
    }

    #[test]
    fn get_or_render_uses_cache() {
        let (_temp, renderer) = renderer();
        renderer.store().set_with_template("web1", "cached", "nginx").unwrap();

        let output = renderer.get_or_render("web1", "nginx", &ctx()).unwrap();
        assert_eq!(output, "cached");
    }

    #[test]
    fn get_or_render_renders_on_miss() {
        let (_temp, renderer) = renderer();
        let output = renderer.get_or_render("web1", "nginx", &ctx()).unwrap();
        assert!(output.contains("example.com"));
        assert_eq!(renderer.store().get("web1").unwrap(), output);
    }

    #[test]
    fn get_or_render_propagates_invalid_id() {
        let (_temp, renderer) = renderer();
        assert!(matches!(
            renderer.get_or_render("", "nginx", &ctx()),
            Err(ConfcacheError::InvalidId { .. })
        ));
    }
}
