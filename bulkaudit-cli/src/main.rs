use clap::Parser;

use bulkaudit_cli::cli::Cli;
use bulkaudit_cli::error::CliError;
use bulkaudit_cli::output::OutputWriter;
use bulkaudit_cli::{commands, config, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load(&cli).await?;

    logging::init_tracing(&config.general)
        .map_err(|e| CliError::Command(format!("logging setup failed: {e}")))?;

    tracing::debug!(config_path = %cli.config.display(), "configuration resolved");

    let writer = OutputWriter::new(cli.output);
    commands::audit::execute(&config, &writer).await?;
    Ok(())
}
