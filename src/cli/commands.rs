//! CLI commands and argument parsing

use crate::pagination::BudgetPolicy;
use crate::service::ListOperation;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paged listing client for the DNS and object storage administration API
#[derive(Parser, Debug)]
#[command(name = "zonepager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the API, overrides the configuration file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the records of one operation
    List {
        /// Operation to list (see `zonepager operations`)
        operation: ListOperation,

        /// Resume from a cursor returned by an earlier call; fetches one page
        #[arg(long)]
        starting_token: Option<String>,

        /// Maximum number of records to return
        #[arg(long)]
        max_items: Option<u64>,

        /// Fetch only the first page
        #[arg(long)]
        single_page: bool,

        /// How --max-items interacts with automatic paging
        #[arg(long, default_value = "bounded")]
        budget: BudgetMode,

        /// Operation parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Bucket to list, shorthand for --param bucket=NAME
        #[arg(long)]
        bucket: Option<String>,
    },

    /// Show the available list operations
    Operations,

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Budget interpretation on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BudgetMode {
    /// Keep paging until the budget is used up
    Bounded,
    /// A budget means one page of at most that many records
    SinglePage,
}

impl From<BudgetMode> for BudgetPolicy {
    fn from(mode: BudgetMode) -> Self {
        match mode {
            BudgetMode::Bounded => BudgetPolicy::Bounded,
            BudgetMode::SinglePage => BudgetPolicy::SinglePage,
        }
    }
}

/// Parse a `key=value` operation parameter
pub fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
