//! Variable interpolation for command lines and result templates.
//!
//! # Syntax
//!
//! - `${KEY}` - replaced with the configuration value for `KEY`
//! - `$${KEY}` - produces literal `${KEY}` in output
//!
//! A lone `$` is left alone, so shell variables such as `$script` pass
//! through untouched.

use crate::error::{Result, SetupError};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing `${var}` interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                literal.push('$');
                if chars.peek() == Some(&'{') {
                    for c in chars.by_ref() {
                        literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                }
            }
            Some('{') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                segments.push(Segment::Variable(name.trim().to_string()));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Unique variable names referenced by `input`.
pub fn extract_variables(input: &str) -> BTreeSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Check if a string contains any interpolation.
pub fn has_interpolation(input: &str) -> bool {
    parse_interpolation(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Variable(_)))
}

/// Context for variable resolution.
///
/// Collected configuration wins over the process environment.
#[derive(Debug, Default, Clone)]
pub struct InterpolationContext {
    /// Configuration collected by the workflow
    pub values: HashMap<String, String>,

    /// Process environment
    pub env: HashMap<String, String>,
}

impl InterpolationContext {
    /// Create a context from configuration values.
    pub fn new(values: &BTreeMap<String, String>) -> Self {
        Self {
            values: values.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            env: HashMap::new(),
        }
    }

    /// Fall back to the process environment for unknown keys.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .or_else(|| self.env.get(name))
            .map(String::as_str)
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` naming the first unresolved variable.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::with_capacity(input.len());

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| SetupError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}}", name),
                        })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}

/// Resolve, substituting `default` for missing variables.
///
/// Used for previews, where an unknown value should not abort rendering.
pub fn resolve_string_with_default(
    input: &str,
    context: &InterpolationContext,
    default: &str,
) -> String {
    parse_interpolation(input)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text,
            Segment::Variable(name) => context.resolve(&name).unwrap_or(default).to_string(),
        })
        .collect()
}
