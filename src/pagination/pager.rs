//! Pager: drives a fetch capability through a pagination run
//!
//! The same `Pager` works as a blocking `Iterator` over a [`PageFetcher`]
//! and as an async stream over an [`AsyncPageFetcher`]. Each step performs
//! at most one remote call, so callers can stop between pages by simply not
//! asking for the next one.

use super::progress::{NoProgress, Progress, ProgressSink};
use super::types::{
    AsyncPageFetcher, NextPage, Page, PageFetcher, PageRequest, PaginationConfig,
    PaginationState,
};
use crate::error::Result;
use futures::Stream;
use std::iter::FusedIterator;
use tracing::debug;

/// Pagination driver over a fetch capability
#[derive(Debug)]
pub struct Pager<F, P = NoProgress> {
    fetcher: F,
    state: PaginationState,
    progress: P,
}

impl<F> Pager<F, NoProgress> {
    /// Create a pager without progress reporting
    pub fn new(fetcher: F, config: &PaginationConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            state: PaginationState::new(config)?,
            progress: NoProgress,
        })
    }
}

impl<F, P> Pager<F, P> {
    /// Report progress to `progress` while auto-iterating
    pub fn with_progress<Q: ProgressSink>(self, progress: Q) -> Pager<F, Q> {
        Pager {
            fetcher: self.fetcher,
            state: self.state,
            progress,
        }
    }

    /// Current pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Borrow the fetch capability
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Give back the fetch capability
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    fn begin(&mut self) -> Option<PageRequest> {
        let request = self.state.next_request()?;
        debug!(
            page = self.state.pages_fetched() + 1,
            cursor = ?request.cursor,
            page_size = request.page_size,
            "Fetching page"
        );
        Some(request)
    }

    fn complete<T>(&mut self, request: &PageRequest, result: Result<Page<T>>) -> Result<Page<T>>
    where
        P: ProgressSink,
    {
        let mut page = match result {
            Ok(page) => page,
            Err(e) => {
                debug!(error = %e, "Page fetch failed, stopping");
                self.state.fail();
                return Err(e);
            }
        };

        let next = self.state.record_page(request, &mut page);

        if !self.state.user_controls_paging() {
            self.progress.on_page(&Progress {
                page_number: self.state.pages_fetched(),
                items_so_far: self.state.total_fetched(),
                cursor: self.state.cursor().map(String::from),
            });
        }

        if let NextPage::Done(reason) = next {
            debug!(
                ?reason,
                pages = self.state.pages_fetched(),
                items = self.state.total_fetched(),
                "Pagination finished"
            );
        }

        Ok(page)
    }
}

// ============================================================================
// Blocking driver
// ============================================================================

impl<F, P> Iterator for Pager<F, P>
where
    F: PageFetcher,
    P: ProgressSink,
{
    type Item = Result<Page<F::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = self.begin()?;
        let result = self.fetcher.fetch_page(&request);
        Some(self.complete(&request, result))
    }
}

impl<F, P> FusedIterator for Pager<F, P>
where
    F: PageFetcher,
    P: ProgressSink,
{
}

impl<F, P> Pager<F, P>
where
    F: PageFetcher,
    P: ProgressSink,
{
    /// Drain every page into one item list, failing on the first error
    pub fn into_items(self) -> Result<Vec<F::Item>> {
        let mut items = Vec::new();
        for page in self {
            items.extend(page?.items);
        }
        Ok(items)
    }
}

// ============================================================================
// Async driver
// ============================================================================

impl<F, P> Pager<F, P>
where
    F: AsyncPageFetcher,
    P: ProgressSink + Send,
{
    /// Fetch the next page, or `None` once the run is over
    pub async fn next_page(&mut self) -> Option<Result<Page<F::Item>>> {
        let request = self.begin()?;
        let result = self.fetcher.fetch_page(&request).await;
        Some(self.complete(&request, result))
    }

    /// Drain every page into one item list, failing on the first error
    pub async fn collect_items(mut self) -> Result<Vec<F::Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await {
            items.extend(page?.items);
        }
        Ok(items)
    }

    /// Turn the pager into a stream of pages
    ///
    /// Dropping the stream between pages stops the run.
    pub fn into_stream(self) -> impl Stream<Item = Result<Page<F::Item>>> {
        futures::stream::unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Some((page, pager))
        })
    }
}
