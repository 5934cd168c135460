//! Output module
//!
//! Writes listed records as they arrive, one page at a time.
//!
//! # Overview
//!
//! This module provides:
//! - An [`OutputSink`] trait receiving pages and a closing [`ListSummary`]
//! - JSON-lines and pretty-printed writers plus an in-memory collector
//! - Drivers that pump a pager into a sink

mod sinks;

pub use sinks::{
    emit_all, emit_all_blocking, CollectSink, JsonLinesSink, ListSummary, OutputSink, PrettySink,
};
