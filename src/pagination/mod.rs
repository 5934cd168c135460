//! Pagination module
//!
//! Bounded cursor pagination over any paged list endpoint.
//!
//! # Overview
//!
//! A [`Pager`] repeatedly asks a fetch capability for one page, threads the
//! server's continuation cursor into the next request and stops when:
//!
//! - the server reports no further cursor,
//! - the caller's item budget is used up (page sizes are clamped to it),
//! - the caller controls paging (an explicit cursor was given), in which case
//!   exactly one page is fetched,
//! - or a fetch fails. Errors are yielded once and end the run.
//!
//! ```rust,ignore
//! use zonepager::pagination::{Page, PaginationConfig, Pager};
//!
//! let config = PaginationConfig::new(100).with_max_items(Some(150));
//! let pager = Pager::new(|req: &PageRequest| fetch(req), &config)?;
//! for page in pager {
//!     println!("{} items", page?.len());
//! }
//! ```

mod pager;
mod progress;
mod types;

pub use pager::Pager;
pub use progress::{NoProgress, Progress, ProgressSink, TracingProgress};
pub use types::{
    AsyncPageFetcher, BudgetPolicy, NextPage, Page, PageFetcher, PageMetadata, PageRequest,
    PaginationConfig, PaginationState, StopReason,
};
