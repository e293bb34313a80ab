//! Audit command handler -- scan every project under the root and report

use tracing::info;

use bulkaudit_core::config::BulkauditConfig;
use bulkaudit_core::event::ScanEvent;
use bulkaudit_runner::AuditRunnerConfig;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{AuditSummary, OutputWriter};

/// Execute an audit run and wait for it to finish.
///
/// Findings do not make the run fail; the summary is returned for the caller.
/// Formatted reports go to stdout only with `show_log` in text mode, since JSON
/// mode reserves stdout for one result object per line.
pub async fn execute(
    config: &BulkauditConfig,
    writer: &OutputWriter,
) -> Result<AuditSummary, CliError> {
    let mut runner_config = AuditRunnerConfig::from_core(&config.audit);
    if writer.format() == OutputFormat::Json {
        runner_config.show_log = false;
    }

    info!(
        root = %runner_config.root_path.display(),
        concurrency = runner_config.effective_concurrency(),
        "starting audit"
    );

    let mut stream = bulkaudit_runner::run(&runner_config)?;
    let run_id = stream.run_id();
    let mut summary = AuditSummary::default();

    while let Some(event) = stream.next().await {
        match event {
            ScanEvent::Data(result) | ScanEvent::Error(result) => {
                summary.record(&result);
                writer.result(&result)?;
            }
            ScanEvent::End => {}
        }
    }
    stream.ensure_complete()?;

    if runner_config.show_log {
        writer.summary(&summary)?;
    }

    info!(
        %run_id,
        scanned = summary.scanned,
        clean = summary.clean,
        vulnerable = summary.vulnerable,
        failed = summary.failed,
        findings = summary.findings,
        "audit complete"
    );

    Ok(summary)
}
