//! The live template set.
//!
//! [`TemplateRegistry::reload`] builds a complete candidate map from the
//! directory (file I/O and parsing happen outside any registry lock) and
//! publishes it with a single pointer swap under the write lock. Readers
//! either see the whole previous generation or the whole new one.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::model::{template_name_for, Template, DEFAULT_SUFFIX};
use crate::error::{ConfcacheError, Result};

/// One published generation of templates.
#[derive(Debug, Default)]
struct Snapshot {
    directory: Option<PathBuf>,
    templates: HashMap<String, Arc<Template>>,
    generation: u64,
}

/// Owns the authoritative name → template mapping.
#[derive(Debug)]
pub struct TemplateRegistry {
    suffix: String,
    live: RwLock<Arc<Snapshot>>,
    /// Serializes reloads so each one diffs against the generation it replaces.
    reload_lock: Mutex<()>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIX)
    }
}

impl TemplateRegistry {
    /// Create an empty registry recognizing files that end in `suffix`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            live: RwLock::new(Arc::new(Snapshot::default())),
            reload_lock: Mutex::new(()),
        }
    }

    /// Create a registry and perform the initial load.
    pub fn load(directory: &Path, suffix: impl Into<String>) -> Result<Self> {
        let registry = Self::new(suffix);
        registry.reload(directory)?;
        Ok(registry)
    }

    /// The recognized template file suffix.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-scan `directory` and atomically replace the live template set.
    ///
    /// Returns the names that were loaded before and are absent now; the
    /// caller decides what to do with artifacts produced by them.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryScan` if the directory cannot be listed and
    /// `TemplateParse` naming the first file that fails to read or parse.
    /// On any error the live set is left untouched.
    pub fn reload(&self, directory: &Path) -> Result<BTreeSet<String>> {
        let _serial = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let candidate = self.build(directory)?;

        let previous = self.snapshot();
        let removed: BTreeSet<String> = previous
            .templates
            .keys()
            .filter(|name| !candidate.contains_key(*name))
            .cloned()
            .collect();

        let next = Arc::new(Snapshot {
            directory: Some(directory.to_path_buf()),
            templates: candidate,
            generation: previous.generation + 1,
        });

        *self.live.write().unwrap_or_else(PoisonError::into_inner) = next;

        tracing::debug!(
            "Loaded {} templates from {} (removed: {:?})",
            self.len(),
            directory.display(),
            removed
        );

        Ok(removed)
    }

    /// Parse every recognized file in `directory` into a fresh map.
    fn build(&self, directory: &Path) -> Result<HashMap<String, Arc<Template>>> {
        let scan_error = |e: std::io::Error| ConfcacheError::DirectoryScan {
            path: directory.to_path_buf(),
            message: e.to_string(),
        };

        let mut templates = HashMap::new();
        for entry in fs::read_dir(directory).map_err(scan_error)? {
            let path = entry.map_err(scan_error)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = template_name_for(&path, &self.suffix) else {
                continue;
            };
            let template = Template::load(name.clone(), &path)?;
            templates.insert(name, Arc::new(template));
        }

        Ok(templates)
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.snapshot().templates.get(name).cloned()
    }

    /// Check if a template is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().templates.contains_key(name)
    }

    /// All loaded template names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().templates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of loaded templates.
    pub fn len(&self) -> usize {
        self.snapshot().templates.len()
    }

    /// True if no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Directory of the last successful reload.
    pub fn directory(&self) -> Option<PathBuf> {
        self.snapshot().directory.clone()
    }

    /// Number of successful reloads so far.
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RenderContext;
    use std::thread;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, body: &str) {
        fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn empty_registry() {
        let registry = TemplateRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.directory().is_none());
        assert_eq!(registry.generation(), 0);
    }

    #[test]
    fn loads_only_recognized_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "a");
        write(temp.path(), "b.conf.tmpl", "b ${x}");
        write(temp.path(), "notes.txt", "ignored");
        fs::create_dir(temp.path().join("dir.conf.tmpl")).unwrap();

        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.directory().as_deref(), Some(temp.path()));
    }

    #[test]
    fn reload_reports_removed_names() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "a");
        write(temp.path(), "b.conf.tmpl", "b");
        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();

        fs::remove_file(temp.path().join("a.conf.tmpl")).unwrap();
        write(temp.path(), "c.conf.tmpl", "c");

        let removed = registry.reload(temp.path()).unwrap();
        assert_eq!(removed, BTreeSet::from(["a".to_string()]));
        assert_eq!(registry.names(), vec!["b", "c"]);
    }

    #[test]
    fn reload_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "a");
        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();

        assert!(registry.reload(temp.path()).unwrap().is_empty());
        assert!(registry.reload(temp.path()).unwrap().is_empty());
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn edited_template_is_replaced() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "old");
        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();
        let before = registry.get("a").unwrap();

        write(temp.path(), "a.conf.tmpl", "new");
        assert!(registry.reload(temp.path()).unwrap().is_empty());

        let ctx = RenderContext::new();
        assert_eq!(before.render(&ctx).unwrap(), "old");
        assert_eq!(registry.get("a").unwrap().render(&ctx).unwrap(), "new");
    }

    #[test]
    fn parse_failure_keeps_previous_generation() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "a v1");
        write(temp.path(), "b.conf.tmpl", "b v1");
        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();
        let generation = registry.generation();

        // a is validly edited, b breaks, c is new: none of it may leak in
        write(temp.path(), "a.conf.tmpl", "a v2");
        write(temp.path(), "b.conf.tmpl", "b ${");
        write(temp.path(), "c.conf.tmpl", "c");

        let err = registry.reload(temp.path()).unwrap_err();
        match err {
            ConfcacheError::TemplateParse { path, .. } => {
                assert_eq!(path, temp.path().join("b.conf.tmpl"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.generation(), generation);
        let ctx = RenderContext::new();
        assert_eq!(registry.get("a").unwrap().render(&ctx).unwrap(), "a v1");
    }

    #[test]
    fn missing_directory_is_scan_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.conf.tmpl", "a");
        let registry = TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap();

        let err = registry.reload(&temp.path().join("gone")).unwrap_err();
        assert!(matches!(err, ConfcacheError::DirectoryScan { .. }));
        assert_eq!(registry.names(), vec!["a"]);
        assert_eq!(registry.directory().as_deref(), Some(temp.path()));
    }

    #[test]
    fn custom_suffix() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.tpl", "a");
        write(temp.path(), "b.conf.tmpl", "b");

        let registry = TemplateRegistry::load(temp.path(), ".tpl").unwrap();
        assert_eq!(registry.names(), vec!["a"]);
        assert_eq!(registry.suffix(), ".tpl");
    }

    #[test]
    fn readers_never_see_partial_generation() {
        let temp = TempDir::new().unwrap();
        for i in 0..20 {
            write(temp.path(), &format!("t{i}.conf.tmpl"), "gen1");
        }
        let registry = Arc::new(TemplateRegistry::load(temp.path(), DEFAULT_SUFFIX).unwrap());
        for i in 0..20 {
            write(temp.path(), &format!("t{i}.conf.tmpl"), "gen2");
        }

        let reader = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let ctx = RenderContext::new();
                for _ in 0..200 {
                    let names = registry.names();
                    assert_eq!(names.len(), 20);
                }
                let rendered: BTreeSet<String> = (0..20)
                    .filter_map(|i| registry.get(&format!("t{i}")))
                    .map(|t| t.render(&ctx).unwrap())
                    .collect();
                assert!(!rendered.is_empty());
            })
        };

        registry.reload(temp.path()).unwrap();
        reader.join().unwrap();

        let ctx = RenderContext::new();
        for i in 0..20 {
            let t = registry.get(&format!("t{i}")).unwrap();
            assert_eq!(t.render(&ctx).unwrap(), "gen2");
        }
    }
}
