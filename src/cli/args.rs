//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::audit::AuditCommands;
use crate::cli::commands::checklist::ChecklistCommands;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::contract::ContractCommands;
use crate::core::config::{Config, Overrides};

#[derive(Parser, Debug)]
#[command(name = "clm")]
#[command(author, version)]
#[command(about = "Browse and maintain contract-lifecycle records from the command line")]
#[command(
    long_about = "Contract Desk loads contract-lifecycle records (contract requests, AI audit \
log entries and closeout checklists) from a contract-management backend, filters and \
pages them locally, and sends edits and deletes back to the server."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config file (YAML)
    #[arg(long, global = true, env = "CLM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "CLM_API_BASE_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Network timeout in seconds
    #[arg(long, global = true, env = "CLM_TIMEOUT_SECS", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Rows per page for list commands
    #[arg(long, global = true, env = "CLM_PAGE_SIZE", value_name = "N")]
    pub page_size: Option<usize>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Log requests and responses to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_base_url: self.api_url.clone(),
            timeout_secs: self.timeout,
            page_size: self.page_size,
        }
    }

    /// Resolve the effective configuration
    pub fn config(&self) -> Result<Config> {
        Ok(Config::resolve(self.config.as_deref(), self.overrides())?)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contract requests: list, inspect, edit, delete
    #[command(subcommand)]
    Contract(ContractCommands),

    /// AI audit log: list and export
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Closeout checklist
    #[command(subcommand)]
    Checklist(ChecklistCommands),

    /// Show the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    /// Bordered table
    Table,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// Record IDs only, one per line
    Id,
    /// Markdown table
    Md,
}
