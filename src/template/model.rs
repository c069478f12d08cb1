//! Loaded template definitions.
//!
//! A [`Template`] is immutable once loaded. A reload builds fresh
//! instances and swaps them in; nothing is edited in place.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::syntax::{self, RenderContext, Segment};
use crate::error::{ConfcacheError, Result};

/// The recognized template suffix in the reference layout.
pub const DEFAULT_SUFFIX: &str = ".conf.tmpl";

/// A parsed, named template loaded from a directory-resident file.
#[derive(Debug, Clone)]
pub struct Template {
    /// Template name: the file basename with the suffix stripped.
    pub name: String,

    /// File the template was parsed from.
    pub source_path: PathBuf,

    /// When this generation of the template was parsed.
    pub loaded_at: DateTime<Utc>,

    body: Vec<Segment>,
}

impl Template {
    /// Parse template source text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateParse` naming `source_path` if the body is invalid.
    pub fn parse(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        source: &str,
    ) -> Result<Self> {
        let source_path = source_path.into();
        let body = syntax::parse_body(source).map_err(|e| ConfcacheError::TemplateParse {
            path: source_path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: name.into(),
            source_path,
            loaded_at: Utc::now(),
            body,
        })
    }

    /// Read and parse a template file.
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| ConfcacheError::TemplateParse {
            path: path.to_path_buf(),
            message: format!("unreadable: {}", e),
        })?;
        Self::parse(name, path, &source)
    }

    /// Render this template against a context.
    ///
    /// # Errors
    ///
    /// Returns `Render` if the body references a variable the context lacks.
    pub fn render(&self, context: &RenderContext) -> Result<String> {
        syntax::render_segments(&self.body, context).map_err(|message| ConfcacheError::Render {
            template: self.name.clone(),
            message,
        })
    }

    /// Variables referenced by the body.
    pub fn variables(&self) -> BTreeSet<&str> {
        syntax::variables(&self.body)
    }

    /// Parsed body segments.
    pub fn segments(&self) -> &[Segment] {
        &self.body
    }
}

/// Map a directory entry to its template name.
///
/// Returns `None` for paths that do not end in `suffix` or whose stem would
/// be empty.
pub fn template_name_for(path: &Path, suffix: &str) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(suffix)?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
