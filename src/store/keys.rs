//! Organization-scoped key schema.
//!
//! The layout is shared with existing deployments and must not change:
//!
//! - artifact key: `{organization}:{id}`
//! - provenance key: `{organization}:template:{id}`
//!
//! The braces around the organization are a Redis cluster hash tag, so an
//! artifact and its provenance entry always land in the same slot.

use crate::error::{ConfcacheError, Result};

/// Segment that marks a provenance key inside a namespace.
pub const PROVENANCE_SEGMENT: &str = "template:";

/// What a raw key inside a namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'a> {
    /// Artifact content for the id.
    Artifact(&'a str),
    /// Provenance entry for the id.
    Provenance(&'a str),
}

impl<'a> KeyKind<'a> {
    /// The id the key belongs to.
    pub fn id(&self) -> &'a str {
        match self {
            KeyKind::Artifact(id) | KeyKind::Provenance(id) => id,
        }
    }
}

/// Key builder for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    organization: String,
    prefix: String,
}

impl Namespace {
    /// Create the namespace for an organization.
    pub fn new(organization: impl Into<String>) -> Self {
        let organization = organization.into();
        let prefix = format!("{{{}}}:", organization);
        Self {
            organization,
            prefix,
        }
    }

    /// The organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Prefix shared by every key of this organization.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key holding the artifact content for `id`.
    pub fn artifact_key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Key holding the template name that produced `id`.
    pub fn provenance_key(&self, id: &str) -> String {
        format!("{}{}{}", self.prefix, PROVENANCE_SEGMENT, id)
    }

    /// Glob pattern matching every key of this organization.
    ///
    /// Glob metacharacters in the organization name are escaped so they
    /// match literally.
    pub fn scan_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.prefix.len() + 1);
        for c in self.prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('*');
        pattern
    }

    /// Classify a raw key. Returns `None` for keys outside this namespace.
    pub fn classify<'a>(&self, key: &'a str) -> Option<KeyKind<'a>> {
        let rest = key.strip_prefix(self.prefix.as_str())?;
        match rest.strip_prefix(PROVENANCE_SEGMENT) {
            Some(id) => Some(KeyKind::Provenance(id)),
            None => Some(KeyKind::Artifact(rest)),
        }
    }
}

/// Reject ids that cannot be stored without colliding with the key schema.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ConfcacheError::InvalidId {
            id: id.to_string(),
            message: "id must not be empty".to_string(),
        });
    }
    if id.starts_with(PROVENANCE_SEGMENT) {
        return Err(ConfcacheError::InvalidId {
            id: id.to_string(),
            message: format!("ids starting with '{}' are reserved", PROVENANCE_SEGMENT),
        });
    }
    Ok(())
}
