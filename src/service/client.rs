//! Service client
//!
//! Ties the HTTP transport, the endpoint registry and the pager together so a
//! caller can list any operation with one call.

use super::endpoints::{EndpointRegistry, ListOperation};
use super::fetcher::EndpointFetcher;
use super::models::ListItem;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{BudgetPolicy, Page, PaginationConfig, Pager, TracingProgress};
use crate::types::{JsonValue, OptionStringExt, StringMap};
use futures::Stream;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

/// Caller options for one listing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Operation parameters (path placeholders and filters)
    pub params: StringMap,
    /// Cursor to resume from; giving one means exactly one page is fetched
    pub starting_token: Option<String>,
    /// Upper bound on the number of items returned
    pub max_items: Option<u64>,
    /// Fetch only the first page
    pub single_page: bool,
    /// How the item budget interacts with auto-iteration
    pub budget_policy: BudgetPolicy,
}

impl ListOptions {
    /// Options that list everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an operation parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Resume from a cursor
    #[must_use]
    pub fn starting_token(mut self, token: impl Into<String>) -> Self {
        self.starting_token = Some(token.into()).none_if_empty();
        self
    }

    /// Limit the number of items
    #[must_use]
    pub fn max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Fetch only one page
    #[must_use]
    pub fn single_page(mut self, single_page: bool) -> Self {
        self.single_page = single_page;
        self
    }

    /// Set the budget policy
    #[must_use]
    pub fn budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.budget_policy = policy;
        self
    }

    /// Pagination settings for an endpoint with the given page cap
    pub fn pagination_config(&self, server_page_cap: u32) -> PaginationConfig {
        PaginationConfig::new(server_page_cap)
            .with_initial_cursor(self.starting_token.clone())
            .with_max_items(self.max_items)
            .with_budget_policy(self.budget_policy)
            .with_single_page(self.single_page)
    }
}

/// Pager over one endpoint, reporting progress through `tracing`
pub type EndpointPager<T> = Pager<EndpointFetcher<T>, TracingProgress>;

/// Client for the provider's list operations
#[derive(Debug, Clone)]
pub struct Client {
    http: Arc<HttpClient>,
    registry: EndpointRegistry,
}

impl Client {
    /// Build a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(config.to_http_config()?)?;
        let registry = config.registry()?;
        info!(base_url = %config.base_url, "Created service client");
        Ok(Self::from_parts(http, registry))
    }

    /// Build a client from an HTTP client and a registry
    pub fn from_parts(http: HttpClient, registry: EndpointRegistry) -> Self {
        Self {
            http: Arc::new(http),
            registry,
        }
    }

    /// Endpoint registry in use
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Fetch capability for `operation` with `params` bound
    pub fn fetcher<T>(
        &self,
        operation: ListOperation,
        params: StringMap,
    ) -> Result<EndpointFetcher<T>> {
        EndpointFetcher::new(
            Arc::clone(&self.http),
            operation,
            self.registry.get(operation).clone(),
            params,
        )
    }

    /// Pager for `operation`
    ///
    /// Items are decoded into `T`; use [`JsonValue`] for untyped records.
    pub fn pager<T>(
        &self,
        operation: ListOperation,
        options: ListOptions,
    ) -> Result<EndpointPager<T>>
    where
        T: DeserializeOwned + Send,
    {
        let cap = self.registry.get(operation).server_page_cap;
        let config = options.pagination_config(cap);
        let fetcher = self.fetcher(operation, options.params)?;
        let progress = TracingProgress::new(operation.name());
        Ok(Pager::new(fetcher, &config)?.with_progress(progress))
    }

    /// Untyped pager for `operation`
    pub fn raw_pager(
        &self,
        operation: ListOperation,
        options: ListOptions,
    ) -> Result<EndpointPager<JsonValue>> {
        self.pager(operation, options)
    }

    /// List every record of `T`'s operation within the options' bounds
    pub async fn list<T: ListItem>(&self, options: ListOptions) -> Result<Vec<T>> {
        self.pager::<T>(T::OPERATION, options)?.collect_items().await
    }

    /// Stream the pages of `T`'s operation
    pub fn stream<T: ListItem>(
        &self,
        options: ListOptions,
    ) -> Result<impl Stream<Item = Result<Page<T>>>> {
        Ok(self.pager::<T>(T::OPERATION, options)?.into_stream())
    }
}
