//! `clm config` command - inspect the effective configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings (file, then environment and flags)
    Show,

    /// Print the config file location
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = global.config()?;

    if print_structured(&config, global.output)? {
        return Ok(());
    }

    match global.output {
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if global.output == OutputFormat::Tsv { "\t" } else { "," };
            println!("api_base_url{}{}", sep, config.api_base_url);
            println!("timeout_secs{}{}", sep, config.timeout_secs);
            println!("page_size{}{}", sep, config.page_size);
        }
        _ => {
            println!("{}: {}", style("API base URL").bold(), style(&config.api_base_url).cyan());
            println!("{}: {}s", style("Timeout").bold(), config.timeout_secs);
            println!("{}: {}", style("Page size").bold(), config.page_size);
        }
    }
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let path = global.config.clone().or_else(Config::default_path);
    match path {
        Some(path) => {
            let note = if path.exists() { "" } else { " (not created)" };
            println!("{}{}", path.display(), style(note).dim());
            Ok(())
        }
        None => Err(miette::miette!(
            "Could not determine a config directory for this platform"
        )),
    }
}
