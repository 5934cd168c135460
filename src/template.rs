//! Path templates for list endpoints
//!
//! Endpoint paths may contain `{name}` placeholders (for example
//! `/{bucket}` for object listings) that are filled from caller-bound
//! parameters. Values are percent-encoded as a single path segment.

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Names of the placeholders in a path template, in order
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Check if a path template has any placeholders
pub fn has_placeholders(template: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(template)
}

/// Fill the placeholders of `template` from `params`
///
/// Every placeholder must have a non-empty value.
pub fn render_path(template: &str, params: &StringMap) -> Result<String> {
    let mut missing = None;

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match params.get(name).filter(|v| !v.is_empty()) {
            Some(value) => urlencoding::encode(value).into_owned(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(Error::MissingPathParam {
            name,
            path: template.to_string(),
        }),
        None => Ok(rendered.into_owned()),
    }
}
