//! Templates: syntax, loaded definitions, and the live registry.
//!
//! Every file in the template directory whose name ends in the recognized
//! suffix (`.conf.tmpl` by default) is a template; its name is the basename
//! with the suffix stripped.
//!
//! # Example
//!
//! ```
//! use confcache::template::{RenderContext, TemplateRegistry};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("nginx.conf.tmpl"), "listen ${port};").unwrap();
//!
//! let registry = TemplateRegistry::load(temp.path(), ".conf.tmpl").unwrap();
//! let template = registry.get("nginx").unwrap();
//! let ctx = RenderContext::new().with("port", "80");
//! assert_eq!(template.render(&ctx).unwrap(), "listen 80;");
//! ```

pub mod model;
pub mod registry;
pub mod syntax;

pub use model::{template_name_for, Template, DEFAULT_SUFFIX};
pub use registry::TemplateRegistry;
pub use syntax::{parse_body, render_segments, variables, RenderContext, Segment, SyntaxError};
