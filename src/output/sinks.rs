//! Output sinks for listed records

use crate::error::{Error, Result};
use crate::pagination::{
    AsyncPageFetcher, Page, PageFetcher, Pager, PaginationState, ProgressSink, StopReason,
};
use serde::Serialize;
use std::io::Write;
use tracing::debug;

/// Outcome of a listing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    /// Operation that was listed
    pub operation: String,
    /// Pages fetched
    pub pages: u64,
    /// Items emitted
    pub items: u64,
    /// Cursor to resume from, when more data remains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Why the run ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Whether the caller controlled paging
    pub user_controls_paging: bool,
}

impl ListSummary {
    /// Summarize a pagination state
    pub fn from_state(operation: impl Into<String>, state: &PaginationState) -> Self {
        Self {
            operation: operation.into(),
            pages: state.pages_fetched(),
            items: state.total_fetched(),
            next_cursor: state.cursor().map(String::from),
            stop_reason: state.stop_reason(),
            user_controls_paging: state.user_controls_paging(),
        }
    }

    /// Check if the server has more data past this run
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Command-line argument that resumes after this run
    ///
    /// Composite cursors contain `&`, so anything outside a safe character
    /// set is single-quoted for the shell.
    pub fn resume_argument(&self) -> Option<String> {
        let cursor = self.next_cursor.as_deref()?;
        let plain = cursor
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+%,".contains(c));
        Some(if plain {
            format!("--starting-token {cursor}")
        } else {
            format!("--starting-token '{}'", cursor.replace('\'', r"'\''"))
        })
    }
}

/// Receives pages as a listing progresses
pub trait OutputSink<T> {
    /// Write one page
    fn emit(&mut self, page: &Page<T>) -> Result<()>;

    /// Called once after the last page
    fn finish(&mut self, _summary: &ListSummary) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// Writes one JSON document per item and line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink over a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Serialize, W: Write> OutputSink<T> for JsonLinesSink<W> {
    fn emit(&mut self, page: &Page<T>) -> Result<()> {
        for item in &page.items {
            serde_json::to_writer(&mut self.writer, item)
                .map_err(|e| Error::output(format!("Failed to serialize record: {e}")))?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn finish(&mut self, _summary: &ListSummary) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Pretty
// ============================================================================

/// Writes indented JSON followed by a short summary
#[derive(Debug)]
pub struct PrettySink<W: Write> {
    writer: W,
}

impl<W: Write> PrettySink<W> {
    /// Create a sink over a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T: Serialize, W: Write> OutputSink<T> for PrettySink<W> {
    fn emit(&mut self, page: &Page<T>) -> Result<()> {
        for item in &page.items {
            let text = serde_json::to_string_pretty(item)
                .map_err(|e| Error::output(format!("Failed to serialize record: {e}")))?;
            writeln!(self.writer, "{text}")?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &ListSummary) -> Result<()> {
        writeln!(
            self.writer,
            "# {}: {} items in {} pages",
            summary.operation, summary.items, summary.pages
        )?;
        if let Some(argument) = summary.resume_argument() {
            writeln!(self.writer, "# more results available, resume with {argument}")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Keeps every item in memory
#[derive(Debug, Clone)]
pub struct CollectSink<T> {
    items: Vec<T>,
    summary: Option<ListSummary>,
}

impl<T> Default for CollectSink<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            summary: None,
        }
    }
}

impl<T> CollectSink<T> {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Items collected so far
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Summary, once the run finished
    pub fn summary(&self) -> Option<&ListSummary> {
        self.summary.as_ref()
    }

    /// Take the collected items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> OutputSink<T> for CollectSink<T> {
    fn emit(&mut self, page: &Page<T>) -> Result<()> {
        self.items.extend_from_slice(&page.items);
        Ok(())
    }

    fn finish(&mut self, summary: &ListSummary) -> Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

// ============================================================================
// Drivers
// ============================================================================

/// Pump every page of an async pager into `sink`
///
/// Stops at the first error; pages already emitted stay written.
pub async fn emit_all<F, P, S>(
    pager: &mut Pager<F, P>,
    sink: &mut S,
    operation: &str,
) -> Result<ListSummary>
where
    F: AsyncPageFetcher,
    P: ProgressSink + Send,
    S: OutputSink<F::Item>,
{
    while let Some(page) = pager.next_page().await {
        sink.emit(&page?)?;
    }
    finish(pager.state(), sink, operation)
}

/// Pump every page of a blocking pager into `sink`
pub fn emit_all_blocking<F, P, S>(
    pager: &mut Pager<F, P>,
    sink: &mut S,
    operation: &str,
) -> Result<ListSummary>
where
    F: PageFetcher,
    P: ProgressSink,
    S: OutputSink<F::Item>,
{
    for page in pager.by_ref() {
        sink.emit(&page?)?;
    }
    finish(pager.state(), sink, operation)
}

fn finish<T, S: OutputSink<T>>(
    state: &PaginationState,
    sink: &mut S,
    operation: &str,
) -> Result<ListSummary> {
    let summary = ListSummary::from_state(operation, state);
    debug!(
        operation,
        pages = summary.pages,
        items = summary.items,
        more = summary.has_more(),
        "Listing complete"
    );
    sink.finish(&summary)?;
    Ok(summary)
}
