//! CLI runner - executes commands

use crate::cli::commands::{BudgetMode, Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::output::{emit_all, JsonLinesSink, ListSummary, OutputSink, PrettySink};
use crate::service::{Client, EndpointPager, EndpointRegistry, ListOperation, ListOptions};
use crate::types::JsonValue;
use serde_json::json;
use std::io::{BufWriter, Write};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Arguments of the `list` subcommand
struct ListArgs<'a> {
    operation: ListOperation,
    starting_token: Option<&'a str>,
    max_items: Option<u64>,
    single_page: bool,
    budget: BudgetMode,
    params: &'a [(String, String)],
    bucket: Option<&'a str>,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                operation,
                starting_token,
                max_items,
                single_page,
                budget,
                params,
                bucket,
            } => {
                self.list(ListArgs {
                    operation: *operation,
                    starting_token: starting_token.as_deref(),
                    max_items: *max_items,
                    single_page: *single_page,
                    budget: *budget,
                    params,
                    bucket: bucket.as_deref(),
                })
                .await
            }
            Commands::Operations => self.operations(),
            Commands::Validate => self.validate(),
        }
    }

    /// Load the configuration, applying `--base-url`
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match (&self.cli.config, &self.cli.base_url) {
            (Some(path), _) => ClientConfig::load(path)?,
            (None, Some(base_url)) => ClientConfig::new(base_url.as_str()),
            (None, None) => {
                return Err(Error::config(
                    "No configuration given (use -C <file> or --base-url <url>)",
                ))
            }
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Run a listing and write its records to stdout
    async fn list(&self, args: ListArgs<'_>) -> Result<()> {
        let config = self.load_config()?;
        let client = Client::new(&config)?;

        let mut options = ListOptions::new()
            .single_page(args.single_page)
            .budget_policy(args.budget.into());
        if let Some(token) = args.starting_token {
            options = options.starting_token(token);
        }
        if let Some(max_items) = args.max_items {
            options = options.max_items(max_items);
        }
        for (key, value) in args.params {
            options = options.param(key, value);
        }
        if let Some(bucket) = args.bucket {
            options = options.param("bucket", bucket);
        }

        let operation = args.operation;
        info!(%operation, "Listing");
        let mut pager = client.raw_pager(operation, options)?;
        let stdout = BufWriter::new(std::io::stdout());

        let summary = match self.cli.format {
            OutputFormat::Json => {
                drive(&mut pager, &mut JsonLinesSink::new(stdout), operation).await?
            }
            OutputFormat::Pretty => {
                drive(&mut pager, &mut PrettySink::new(stdout), operation).await?
            }
        };

        if self.cli.format == OutputFormat::Json {
            if let Some(argument) = summary.resume_argument() {
                eprintln!("More results available, resume with {argument}");
            }
        }
        Ok(())
    }

    /// Print the endpoint registry
    fn operations(&self) -> Result<()> {
        let registry = match (&self.cli.config, &self.cli.base_url) {
            (None, None) => EndpointRegistry::builtin(),
            _ => self.load_config()?.registry()?,
        };

        let mut out = std::io::stdout().lock();
        for (operation, spec) in registry.iter() {
            match self.cli.format {
                OutputFormat::Json => {
                    let line = json!({
                        "operation": operation,
                        "endpoint": spec,
                    });
                    writeln!(out, "{line}")?;
                }
                OutputFormat::Pretty => {
                    writeln!(
                        out,
                        "{:<26} {:<26} cursor={:<20} page_size={:<12} cap={}",
                        operation.name(),
                        spec.path,
                        spec.cursor_param,
                        spec.page_size_param,
                        spec.server_page_cap
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        match self.cli.format {
            OutputFormat::Json => {
                let result = json!({
                    "valid": true,
                    "base_url": config.base_url,
                    "endpoint_overrides": config.endpoints.len(),
                });
                println!("{result}");
            }
            OutputFormat::Pretty => {
                println!("Configuration is valid");
                println!("  Base URL: {}", config.base_url);
                println!("  Endpoint overrides: {}", config.endpoints.len());
            }
        }
        Ok(())
    }
}

async fn drive<S: OutputSink<JsonValue>>(
    pager: &mut EndpointPager<JsonValue>,
    sink: &mut S,
    operation: ListOperation,
) -> Result<ListSummary> {
    emit_all(pager, sink, operation.name()).await
}
