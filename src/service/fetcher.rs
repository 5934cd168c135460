//! Page fetcher over the HTTP transport
//!
//! Turns a [`PageRequest`] into one GET against an endpoint and decodes the
//! JSON response into a [`Page`].

use super::cursor::{self, as_string};
use super::endpoints::{EndpointSpec, ListOperation};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::{AsyncPageFetcher, Page, PageMetadata, PageRequest};
use crate::template;
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Fetches pages of one list operation with caller-bound parameters
pub struct EndpointFetcher<T = JsonValue> {
    client: Arc<HttpClient>,
    operation: ListOperation,
    spec: EndpointSpec,
    path: String,
    params: StringMap,
    _item: PhantomData<fn() -> T>,
}

impl<T> EndpointFetcher<T> {
    /// Bind `params` to an endpoint
    ///
    /// Parameters named by path placeholders are substituted into the path;
    /// the rest are sent as query parameters on every page request.
    pub fn new(
        client: Arc<HttpClient>,
        operation: ListOperation,
        spec: EndpointSpec,
        mut params: StringMap,
    ) -> Result<Self> {
        for required in &spec.required_params {
            if params.get(required).map_or(true, String::is_empty) {
                return Err(Error::invalid_value(
                    required.as_str(),
                    format!("required by {operation}"),
                ));
            }
        }
        let reserved = spec.cursor_params().chain([spec.page_size_param.as_str()]);
        for name in reserved {
            if params.contains_key(name) {
                return Err(Error::invalid_value(
                    name,
                    "is managed by pagination; use the starting token or max items instead",
                ));
            }
        }

        let path = template::render_path(&spec.path, &params)?;
        for name in template::placeholders(&spec.path) {
            params.remove(&name);
        }

        Ok(Self {
            client,
            operation,
            spec,
            path,
            params,
            _item: PhantomData,
        })
    }

    /// Operation this fetcher lists
    pub fn operation(&self) -> ListOperation {
        self.operation
    }

    /// Endpoint description in use
    pub fn spec(&self) -> &EndpointSpec {
        &self.spec
    }

    /// Rendered request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters for one page request
    pub fn query(&self, request: &PageRequest) -> Result<Vec<(String, String)>> {
        let mut query: Vec<(String, String)> = self
            .spec
            .fixed_params
            .iter()
            .chain(&self.params)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        query.push((
            self.spec.page_size_param.clone(),
            request.page_size.to_string(),
        ));
        if let Some(token) = &request.cursor {
            query.extend(cursor::to_query(&self.spec, token)?);
        }
        Ok(query)
    }
}

impl<T> std::fmt::Debug for EndpointFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointFetcher")
            .field("operation", &self.operation)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> AsyncPageFetcher for EndpointFetcher<T>
where
    T: DeserializeOwned + Send,
{
    type Item = T;

    async fn fetch_page(&mut self, request: &PageRequest) -> Result<Page<T>> {
        let query = self.query(request)?;
        let body: JsonValue = self.client.get_json(&self.path, &query).await?;
        let page = parse_page(&self.spec, body)?;

        debug!(
            operation = %self.operation,
            items = page.len(),
            truncated = ?page.metadata.is_truncated,
            next = ?page.next_cursor,
            "Decoded page"
        );
        Ok(page)
    }
}

/// Decode one list response according to `spec`
pub fn parse_page<T: DeserializeOwned>(spec: &EndpointSpec, body: JsonValue) -> Result<Page<T>> {
    let JsonValue::Object(mut fields) = body else {
        return Err(Error::decode("list response is not a JSON object"));
    };

    let items = match fields.remove(&spec.items_field) {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(values)) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).map_err(|e| {
                    Error::decode(format!("{}[{index}]: {e}", spec.items_field))
                })
            })
            .collect::<Result<Vec<T>>>()?,
        Some(other) => {
            return Err(Error::decode(format!(
                "{} is not an array: {other}",
                spec.items_field
            )))
        }
    };

    let is_truncated = spec
        .truncated_field
        .as_ref()
        .and_then(|field| fields.remove(field))
        .and_then(|value| as_bool(&value));
    let marker = spec
        .marker_field
        .as_ref()
        .and_then(|field| fields.remove(field))
        .and_then(|value| as_string(&value));
    let max_items = fields
        .remove("MaxItems")
        .or_else(|| fields.remove("MaxKeys"))
        .and_then(|value| as_string(&value))
        .and_then(|value| value.parse().ok());

    let next_cursor =
        cursor::take_next(spec, &mut fields).filter(|_| is_truncated != Some(false));

    let metadata = PageMetadata {
        is_truncated,
        marker,
        max_items,
        extra: fields,
    };

    Ok(Page::new(items, next_cursor).with_metadata(metadata))
}

/// Read a bool that may arrive as a string
fn as_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}
