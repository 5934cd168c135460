//! CLI module
//!
//! Command-line interface for listing records.
//!
//! # Commands
//!
//! - `list` - Page through one list operation
//! - `operations` - Show the known list operations
//! - `validate` - Check a configuration file

mod commands;
mod runner;

pub use commands::{parse_param, BudgetMode, Cli, Commands, OutputFormat};
pub use runner::Runner;
