use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use clm::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = cli.global;
    match cli.command {
        Commands::Contract(cmd) => clm::cli::commands::contract::run(cmd, &global),
        Commands::Audit(cmd) => clm::cli::commands::audit::run(cmd, &global),
        Commands::Checklist(cmd) => clm::cli::commands::checklist::run(cmd, &global),
        Commands::Config(cmd) => clm::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => clm::cli::commands::completions::run(args),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: bool) {
    let default = if verbose { "clm=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
