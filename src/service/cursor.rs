//! Cursor codec for list endpoints
//!
//! The pager sees a cursor as one opaque string. Most endpoints resume from a
//! single marker and their cursor is that marker verbatim. Endpoints with
//! [`CursorPart`](super::endpoints::CursorPart)s resume only when every marker
//! is sent back, so their cursor is the markers form-encoded as
//! `param=value` pairs, main cursor parameter first.

use super::endpoints::EndpointSpec;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, OptionStringExt};
use url::form_urlencoded;

/// Take the next cursor out of a decoded response body
///
/// Returns `None` when the main marker is absent or empty. Empty secondary
/// markers are left out of the packed cursor.
pub fn take_next(spec: &EndpointSpec, fields: &mut JsonObject) -> Option<String> {
    let main = take_string(fields, &spec.next_cursor_field)?;
    if !spec.has_composite_cursor() {
        return Some(main);
    }

    let mut packed = form_urlencoded::Serializer::new(String::new());
    packed.append_pair(&spec.cursor_param, &main);
    for part in &spec.cursor_parts {
        if let Some(value) = take_string(fields, &part.field) {
            packed.append_pair(&part.param, &value);
        }
    }
    Some(packed.finish())
}

/// Query parameters that resume the listing from `cursor`
pub fn to_query(spec: &EndpointSpec, cursor: &str) -> Result<Vec<(String, String)>> {
    if !spec.has_composite_cursor() {
        return Ok(vec![(spec.cursor_param.clone(), cursor.to_string())]);
    }

    let pairs: Vec<(String, String)> = form_urlencoded::parse(cursor.as_bytes())
        .into_owned()
        .collect();
    if let Some((key, _)) = pairs
        .iter()
        .find(|(key, _)| !spec.cursor_params().any(|param| param == key.as_str()))
    {
        return Err(Error::invalid_value(
            "starting_token",
            format!("'{key}' is not a cursor parameter of {}", spec.path),
        ));
    }
    if !pairs.iter().any(|(key, _)| *key == spec.cursor_param) {
        return Err(Error::invalid_value(
            "starting_token",
            format!("missing '{}'", spec.cursor_param),
        ));
    }
    Ok(pairs)
}

/// Read a string-or-scalar field
pub(super) fn as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn take_string(fields: &mut JsonObject, name: &str) -> Option<String> {
    fields
        .remove(name)
        .and_then(|value| as_string(&value))
        .none_if_empty()
}
