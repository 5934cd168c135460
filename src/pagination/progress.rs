//! Progress reporting for auto-iterating listings

use std::fmt;
use tracing::info;

/// Snapshot taken after each page of an auto-iterating run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 1-based number of the page just fetched
    pub page_number: u64,
    /// Items emitted so far, this page included
    pub items_so_far: u64,
    /// Cursor the next request will use
    pub cursor: Option<String>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {}: {} items retrieved",
            self.page_number, self.items_so_far
        )?;
        if let Some(cursor) = &self.cursor {
            write!(f, ", next cursor {cursor}")?;
        }
        Ok(())
    }
}

/// Receives progress notifications
///
/// Only called while the pager iterates on the caller's behalf.
pub trait ProgressSink {
    /// Called once per fetched page
    fn on_page(&mut self, progress: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn on_page(&mut self, progress: &Progress) {
        self(progress);
    }
}

/// Discards progress notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_page(&mut self, _progress: &Progress) {}
}

/// Logs progress through `tracing`
#[derive(Debug, Clone)]
pub struct TracingProgress {
    operation: String,
}

impl TracingProgress {
    /// Create a sink labelled with the listing operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn on_page(&mut self, progress: &Progress) {
        info!(
            operation = %self.operation,
            page = progress.page_number,
            items = progress.items_so_far,
            cursor = progress.cursor.as_deref().unwrap_or("-"),
            "Retrieved page"
        );
    }
}
