//! Error types for confcache operations.
//!
//! This module defines [`ConfcacheError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Reload failures (`TemplateParse`, `DirectoryScan`) leave the last
//!   good template set live; callers log them and keep serving
//! - `NotFound` / `ProvenanceNotFound` are ordinary outcomes, never retried
//! - `Backend` carries the sub-step that failed so partial writes can be
//!   diagnosed and retried
//! - Use `anyhow::Error` (via `ConfcacheError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for confcache operations.
#[derive(Debug, Error)]
pub enum ConfcacheError {
    /// A template file failed to parse during a reload.
    #[error("Failed to parse template {path}: {message}")]
    TemplateParse { path: PathBuf, message: String },

    /// The template directory could not be listed.
    #[error("Failed to scan template directory {path}: {message}")]
    DirectoryScan { path: PathBuf, message: String },

    /// No artifact is cached under the id (never written, removed, or expired).
    #[error("Key (id) does not exist: {id}")]
    NotFound { id: String },

    /// No provenance entry is recorded for the id.
    #[error("Template information not found for config: {id}")]
    ProvenanceNotFound { id: String },

    /// The storage backend rejected an operation.
    #[error("Storage backend failed during {operation}: {message}")]
    Backend { operation: String, message: String },

    /// Referenced template is not loaded.
    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },

    /// Template execution failed.
    #[error("Failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    /// Artifact id cannot be stored.
    #[error("Invalid config id '{id}': {message}")]
    InvalidId { id: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConfcacheError {
    /// Build a backend error for the named sub-step.
    pub fn backend(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// True for both artifact and provenance misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ProvenanceNotFound { .. })
    }
}

/// Result type alias for confcache operations.
pub type Result<T> = std::result::Result<T, ConfcacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parse_displays_path_and_message() {
        let err = ConfcacheError::TemplateParse {
            path: PathBuf::from("/conf/nginx.conf.tmpl"),
            message: "unterminated '${'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/conf/nginx.conf.tmpl"));
        assert!(msg.contains("unterminated"));
    }

    #[test]
    fn directory_scan_displays_path() {
        let err = ConfcacheError::DirectoryScan {
            path: PathBuf::from("/missing"),
            message: "No such file or directory".into(),
        };
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn not_found_displays_id() {
        let err = ConfcacheError::NotFound { id: "cfg1".into() };
        assert!(err.to_string().contains("cfg1"));
        assert!(err.is_not_found());
    }

    #[test]
    fn provenance_not_found_is_not_found() {
        let err = ConfcacheError::ProvenanceNotFound { id: "cfg1".into() };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Template information"));
    }

    #[test]
    fn backend_displays_operation() {
        let err = ConfcacheError::backend("set provenance", "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("set provenance"));
        assert!(msg.contains("connection reset"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn render_displays_template_and_message() {
        let err = ConfcacheError::Render {
            template: "nginx".into(),
            message: "variable 'port' is not set".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("nginx"));
        assert!(msg.contains("port"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ConfcacheError = io_err.into();
        assert!(matches!(err, ConfcacheError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(ConfcacheError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
