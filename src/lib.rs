// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # zonepager
//!
//! Bounded cursor pagination for the list operations of a hosted-zone DNS
//! and object storage administration API.
//!
//! ## Features
//!
//! - **Cursor Pagination**: follows continuation cursors until the server is done
//! - **Item Budgets**: page sizes are clamped so no more than `max_items` are fetched
//! - **Caller-Controlled Paging**: a starting token fetches exactly one page
//! - **Fail-Fast**: the first error is yielded once and ends the run
//! - **HTTP Transport**: retries, backoff and rate limiting below the pager
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zonepager::config::ClientConfig;
//! use zonepager::service::{Client, HostedZone, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> zonepager::Result<()> {
//!     let config = ClientConfig::load("zonepager.yaml")?;
//!     let client = Client::new(&config)?;
//!
//!     let zones: Vec<HostedZone> = client.list(ListOptions::new().max_items(150)).await?;
//!     println!("{} zones", zones.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │   CLI: list / operations / validate   Output sinks     │
//! └───────────────────────────┬───────────────────────────┘
//!                             │
//! ┌───────────────┬───────────┴───────────┬───────────────┐
//! │    Service    │      Pagination       │     HTTP      │
//! ├───────────────┼───────────────────────┼───────────────┤
//! │ Endpoints     │ Pager (iter + stream) │ Retry         │
//! │ Typed records │ Budget / cursor state │ Rate limit    │
//! │ Page fetcher  │ Progress              │ Backoff       │
//! └───────────────┴───────────────────────┴───────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Bounded cursor pagination
pub mod pagination;

/// Path templates
pub mod template;

/// List operations, typed records and the service client
pub mod service;

/// Output sinks
pub mod output;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ClientConfig;
pub use pagination::{Page, PageRequest, PaginationConfig, Pager};
pub use service::{Client, ListOperation, ListOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
