//! Template body syntax.
//!
//! Template files are literal text with `${variable}` substitutions.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with the variable's value at render time
//! - `$${escaped}` - produces literal `${escaped}` in output
//! - `$$` - produces a literal `$`
//!
//! Variable names are non-empty and made of ASCII letters, digits, `_`, `.`
//! and `-`.
//!
//! # Example
//!
//! ```
//! use confcache::template::{parse_body, render_segments, RenderContext};
//!
//! let body = parse_body("listen ${port};").unwrap();
//! let ctx = RenderContext::new().with("port", "8080");
//! assert_eq!(render_segments(&body, &ctx).unwrap(), "listen 8080;");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// A segment of a parsed template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// A syntax error with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct SyntaxError {
    /// Byte offset into the template source.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

impl SyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Parse a template body into segments.
///
/// # Errors
///
/// Fails on an unterminated `${`, an empty variable name, or a character
/// that is not allowed in a variable name.
pub fn parse_body(input: &str) -> Result<Vec<Segment>, SyntaxError> {
    let mut segments = Vec::new();
    let mut chars = input.char_indices().peekable();
    let mut current_literal = String::new();

    while let Some((pos, c)) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some((_, '$')) => {
                // $$ becomes $, $${...} becomes a literal ${...}
                chars.next();
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    current_literal.push_str("${");
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(SyntaxError::new(pos, "unterminated '$${'"));
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some((_, '{')) => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                let mut closed = false;
                for (offset, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    if !is_name_char(c) {
                        return Err(SyntaxError::new(
                            offset,
                            format!("invalid character {:?} in variable name", c),
                        ));
                    }
                    var_name.push(c);
                }

                if !closed {
                    return Err(SyntaxError::new(pos, "unterminated '${'"));
                }
                if var_name.is_empty() {
                    return Err(SyntaxError::new(pos, "empty variable name"));
                }

                segments.push(Segment::Variable(var_name));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    Ok(segments)
}

/// Variable names referenced by a parsed body, deduplicated and sorted.
pub fn variables(segments: &[Segment]) -> BTreeSet<&str> {
    segments
        .iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Values available to a render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    vars: BTreeMap<String, String>,
}

impl RenderContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of variables set.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Build a context from `key=value` pairs (as given on the command line).
    ///
    /// Only the first `=` splits; the value may itself contain `=`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ctx = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty variable name in '{}'", pair));
            }
            ctx.insert(key, value);
        }
        Ok(ctx)
    }
}

/// Render parsed segments against a context.
///
/// Returns the name of the first unset variable on failure.
pub fn render_segments(segments: &[Segment], context: &RenderContext) -> Result<String, String> {
    let mut result = String::new();

    for segment in segments {
        match segment {
            Segment::Literal(text) => result.push_str(text),
            Segment::Variable(name) => {
                let value = context
                    .get(name)
                    .ok_or_else(|| format!("variable '{}' is not set", name))?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}
