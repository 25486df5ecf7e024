//! rostersync - reconcile the staff roster against the directory.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rostersync_cli::{runner, Cli, CliResult, Settings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let settings = Settings::load(&cli)?;
    if settings.verbose {
        tracing::debug!(?settings, "resolved configuration");
    }

    let report = runner::run(&settings).await?;

    println!("{}", report.summary());
    if !report.change_log.is_empty() {
        println!();
        for entry in &report.change_log {
            println!("{entry}");
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
