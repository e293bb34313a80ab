//! Effective configuration resolution
//!
//! Precedence: command-line flags > `BULKAUDIT_*` environment > config file > defaults.

use bulkaudit_core::config::BulkauditConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Load the config file (a missing file means defaults), then apply flags.
pub async fn load(cli: &Cli) -> Result<BulkauditConfig, CliError> {
    let mut config = BulkauditConfig::load_or_default(&cli.config).await?;
    apply_cli_overrides(cli, &mut config)?;
    config.validate()?;
    Ok(config)
}

/// Apply command-line flags on top of a loaded config.
///
/// Without a positional root and without `audit.root_path` in the file,
/// the current directory is scanned.
pub fn apply_cli_overrides(cli: &Cli, config: &mut BulkauditConfig) -> Result<(), CliError> {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if cli.show_log {
        config.audit.show_log = true;
    }
    if let Some(jobs) = cli.jobs {
        config.audit.max_concurrency = jobs;
    }

    match &cli.root {
        Some(root) => config.audit.root_path = root.display().to_string(),
        None if config.audit.root_path.is_empty() => {
            config.audit.root_path = std::env::current_dir()?.display().to_string();
        }
        None => {}
    }

    Ok(())
}
