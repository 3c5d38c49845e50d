use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ridicule::cli::Cli;
use ridicule::Config;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ridicule=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(cli).context("invalid arguments")?;
    let report = ridicule::run(&config)
        .with_context(|| format!("generating mocks for {}", config.source.display()))?;
    if !report.warnings.is_empty() {
        tracing::warn!(
            count = report.warnings.len(),
            "some members could not be mocked faithfully; see warnings above"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
