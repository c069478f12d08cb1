//! Configuration validation rules.
//!
//! This module validates settings before any store or driver is built:
//! - Organization must be non-empty and brace-free (it becomes a hash tag)
//! - The remote backend needs a URL
//! - TTL, scan page size and poll interval must be positive
//! - The template suffix must start with `.`

use crate::config::schema::Settings;
use crate::error::{ConfcacheError, Result};
use crate::reload::ReloadMode;
use crate::store::BackendKind;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate settings and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_settings(settings: &Settings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_organization(settings));
    errors.extend(validate_storage(settings));
    errors.extend(validate_templates(settings));
    errors.extend(validate_reload(settings));

    errors
}

fn validate_organization(settings: &Settings) -> Vec<ValidationError> {
    let org = &settings.organization;
    let mut errors = Vec::new();

    if org.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-organization",
            "organization must not be empty",
        ));
    }
    if org.contains('{') || org.contains('}') {
        errors.push(ValidationError::new(
            "organization-braces",
            format!("organization '{}' must not contain '{{' or '}}'", org),
        ));
    }

    errors
}

fn validate_storage(settings: &Settings) -> Vec<ValidationError> {
    let storage = &settings.storage;
    let mut errors = Vec::new();

    if storage.backend == BackendKind::Remote && storage.url.is_none() {
        errors.push(ValidationError::new(
            "missing-url",
            "storage.url (or REDIS_URL) is required for the remote backend",
        ));
    }

    match settings.ttl() {
        Ok(ttl) if ttl.is_zero() => errors.push(ValidationError::new(
            "zero-ttl",
            "storage.ttl must be greater than zero",
        )),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("invalid-ttl", e.to_string())),
    }

    if storage.scan_count == 0 {
        errors.push(ValidationError::new(
            "zero-scan-count",
            "storage.scan_count must be greater than zero",
        ));
    }

    errors
}

fn validate_templates(settings: &Settings) -> Vec<ValidationError> {
    let suffix = &settings.templates.suffix;
    if suffix.len() < 2 || !suffix.starts_with('.') {
        vec![ValidationError::new(
            "invalid-suffix",
            format!("templates.suffix '{}' must start with '.'", suffix),
        )]
    } else {
        Vec::new()
    }
}

fn validate_reload(settings: &Settings) -> Vec<ValidationError> {
    if settings.reload.mode == ReloadMode::Off {
        return Vec::new();
    }
    match settings.reload_interval() {
        Ok(interval) if interval.is_zero() => vec![ValidationError::new(
            "zero-interval",
            "reload.interval must be greater than zero",
        )],
        Ok(_) => Vec::new(),
        Err(e) => vec![ValidationError::new("invalid-interval", e.to_string())],
    }
}

/// Validate settings, returning Result.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(settings: &Settings) -> Result<()> {
    let errors = validate_settings(settings);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ConfcacheError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
