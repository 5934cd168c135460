//! Pagination types and traits
//!
//! Defines the page model, the fetch capabilities and the pagination state
//! machine shared by the blocking and async drivers.

use crate::error::{Error, Result};
use crate::types::{JsonObject, OptionStringExt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Requests and Pages
// ============================================================================

/// Parameters for one remote list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation cursor; `None` starts from the beginning
    pub cursor: Option<String>,
    /// Number of items to ask the server for
    pub page_size: u32,
}

impl PageRequest {
    /// Create a request for the first page
    pub fn first(page_size: u32) -> Self {
        Self {
            cursor: None,
            page_size,
        }
    }

    /// Create a request resuming at `cursor`
    pub fn resume(cursor: impl Into<String>, page_size: u32) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size,
        }
    }
}

/// Response metadata echoed alongside a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Truncation flag reported by the service, when it sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_truncated: Option<bool>,
    /// Marker the service echoed back for this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Page size the service says it applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    /// Remaining top-level response fields
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub extra: JsonObject,
}

/// One batch of results returned by a single remote call
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order
    pub items: Vec<T>,
    /// Cursor for the following page, absent when no more data exists
    pub next_cursor: Option<String>,
    /// Response metadata
    pub metadata: PageMetadata,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor,
            metadata: PageMetadata::default(),
        }
    }

    /// Create the final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Attach response metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if the server reported a continuation cursor
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Convert the items, keeping cursor and metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            metadata: self.metadata,
        }
    }
}

// ============================================================================
// Fetch Capabilities
// ============================================================================

/// Blocking capability that performs one remote list call
///
/// Implemented for any `FnMut(&PageRequest) -> Result<Page<T>>`.
pub trait PageFetcher {
    /// Item type produced by the endpoint
    type Item;

    /// Fetch the page described by `request`
    fn fetch_page(&mut self, request: &PageRequest) -> Result<Page<Self::Item>>;
}

impl<T, F> PageFetcher for F
where
    F: FnMut(&PageRequest) -> Result<Page<T>>,
{
    type Item = T;

    fn fetch_page(&mut self, request: &PageRequest) -> Result<Page<T>> {
        self(request)
    }
}

/// Async capability that performs one remote list call
#[async_trait]
pub trait AsyncPageFetcher: Send {
    /// Item type produced by the endpoint
    type Item: Send;

    /// Fetch the page described by `request`
    async fn fetch_page(&mut self, request: &PageRequest) -> Result<Page<Self::Item>>;
}

// ============================================================================
// Configuration
// ============================================================================

/// How a caller-supplied item budget affects auto-iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPolicy {
    /// The budget bounds auto-iteration across as many pages as needed
    #[default]
    Bounded,
    /// Supplying a budget hands paging control to the caller: one page only
    SinglePage,
}

/// Settings for one pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Resume point
    pub initial_cursor: Option<String>,
    /// Maximum number of items to emit in total
    pub max_items: Option<u64>,
    /// Largest page size the endpoint honors
    pub server_page_cap: u32,
    /// Budget interpretation
    pub budget_policy: BudgetPolicy,
    /// Fetch exactly one page even without a cursor
    pub single_page: bool,
}

impl PaginationConfig {
    /// Create settings for an endpoint with the given page cap
    pub fn new(server_page_cap: u32) -> Self {
        Self {
            initial_cursor: None,
            max_items: None,
            server_page_cap,
            budget_policy: BudgetPolicy::default(),
            single_page: false,
        }
    }

    /// Resume from a previously returned cursor
    #[must_use]
    pub fn with_initial_cursor(mut self, cursor: Option<String>) -> Self {
        self.initial_cursor = cursor;
        self
    }

    /// Cap the total number of items
    #[must_use]
    pub fn with_max_items(mut self, max_items: Option<u64>) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the budget policy
    #[must_use]
    pub fn with_budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.budget_policy = policy;
        self
    }

    /// Disable auto-iteration
    #[must_use]
    pub fn with_single_page(mut self, single_page: bool) -> Self {
        self.single_page = single_page;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.server_page_cap == 0 {
            return Err(Error::pagination(
                "server page cap must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Pagination State
// ============================================================================

/// Why a pagination run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The server reported no further cursor
    CursorExhausted,
    /// The item budget reached zero
    BudgetExhausted,
    /// The caller controls paging; one page was fetched
    SinglePage,
    /// A budgeted run received an empty page
    EmptyPage,
    /// The server returned the same cursor on an empty page
    CursorStalled,
    /// A fetch failed
    Failed,
}

/// Outcome of recording a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Another request should follow
    Continue,
    /// No further requests
    Done(StopReason),
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// Tracks pagination progress for a single run
///
/// Created fresh per listing and mutated only by the pager driving it.
#[derive(Debug, Clone)]
pub struct PaginationState {
    cursor: Option<String>,
    remaining_budget: Option<u64>,
    total_fetched: u64,
    pages_fetched: u64,
    user_controls_paging: bool,
    server_page_cap: u32,
    stop_reason: Option<StopReason>,
}

impl PaginationState {
    /// Create a new pagination state from validated settings
    pub fn new(config: &PaginationConfig) -> Result<Self> {
        config.validate()?;

        let cursor = config.initial_cursor.clone().none_if_empty();
        let user_controls_paging = cursor.is_some()
            || config.single_page
            || (config.max_items.is_some() && config.budget_policy == BudgetPolicy::SinglePage);

        Ok(Self {
            cursor,
            remaining_budget: config.max_items,
            total_fetched: 0,
            pages_fetched: 0,
            user_controls_paging,
            server_page_cap: config.server_page_cap,
            stop_reason: None,
        })
    }

    /// Current cursor (the resume point once the run is over)
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Items still wanted, `None` when unbounded
    pub fn remaining_budget(&self) -> Option<u64> {
        self.remaining_budget
    }

    /// Items emitted so far
    pub fn total_fetched(&self) -> u64 {
        self.total_fetched
    }

    /// Pages fetched so far
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Check if the caller manages paging
    pub fn user_controls_paging(&self) -> bool {
        self.user_controls_paging
    }

    /// Check if the run is over
    pub fn is_done(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// Reason the run ended
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Page size for the next request
    pub fn page_size(&self) -> u32 {
        match self.remaining_budget {
            Some(remaining) => remaining.min(u64::from(self.server_page_cap)) as u32,
            None => self.server_page_cap,
        }
    }

    /// Plan the next request, or `None` when the run is over
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.is_done() {
            return None;
        }
        if self.remaining_budget == Some(0) {
            self.stop_reason = Some(StopReason::BudgetExhausted);
            return None;
        }

        Some(PageRequest {
            cursor: self.cursor.clone(),
            page_size: self.page_size(),
        })
    }

    /// Account for a page fetched with `request` and decide whether to continue
    ///
    /// Normalizes the page's cursor and drops items past the remaining budget.
    pub fn record_page<T>(&mut self, request: &PageRequest, page: &mut Page<T>) -> NextPage {
        if let Some(remaining) = self.remaining_budget {
            if page.items.len() as u64 > remaining {
                warn!(
                    received = page.items.len(),
                    remaining, "Server returned more items than requested, dropping the excess"
                );
                page.items.truncate(remaining as usize);
            }
        }

        let received = page.items.len() as u64;
        self.total_fetched += received;
        self.pages_fetched += 1;
        if let Some(remaining) = self.remaining_budget.as_mut() {
            *remaining = remaining.saturating_sub(received);
        }

        page.next_cursor = page.next_cursor.take().none_if_empty();
        let stalled =
            received == 0 && page.next_cursor.is_some() && page.next_cursor == request.cursor;
        self.cursor.clone_from(&page.next_cursor);

        let reason = if self.user_controls_paging {
            Some(StopReason::SinglePage)
        } else if self.cursor.is_none() {
            Some(StopReason::CursorExhausted)
        } else if self.remaining_budget == Some(0) {
            Some(StopReason::BudgetExhausted)
        } else if received == 0 && self.remaining_budget.is_some() {
            Some(StopReason::EmptyPage)
        } else if stalled {
            warn!(
                cursor = ?self.cursor,
                "Server returned an empty page without advancing the cursor"
            );
            Some(StopReason::CursorStalled)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                self.stop_reason = Some(reason);
                NextPage::Done(reason)
            }
            None => NextPage::Continue,
        }
    }

    /// Mark the run as failed
    pub fn fail(&mut self) {
        self.stop_reason = Some(StopReason::Failed);
    }
}
