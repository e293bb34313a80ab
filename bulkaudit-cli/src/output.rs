//! Output formatting abstraction for text vs JSON rendering
//!
//! Scan results and the final summary flow through [`OutputWriter`], which handles
//! format switching. Formatted per-project reports are written by the runner itself
//! (see `--show-log`); this module only decides what else reaches stdout.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use bulkaudit_core::types::ScanResult;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// | Format | per result                  | summary   |
/// |--------|-----------------------------|-----------|
/// | text   | nothing                     | one line  |
/// | json   | one compact JSON object/line | nothing   |
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write one settled scan result to stdout.
    pub fn result(&self, result: &ScanResult) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_result(&mut handle, result)
    }

    /// Write the run summary to stdout.
    pub fn summary<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_summary(&mut handle, payload)
    }

    fn write_result(&self, w: &mut dyn Write, result: &ScanResult) -> Result<(), CliError> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut *w, result)?;
            writeln!(w)?;
            w.flush()?;
        }
        Ok(())
    }

    fn write_summary<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        if self.format == OutputFormat::Text {
            payload.render_text(w)?;
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by CLI output payloads alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Per-outcome tally of a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub scanned: usize,
    pub clean: usize,
    pub vulnerable: usize,
    pub failed: usize,
    pub findings: usize,
}

impl AuditSummary {
    /// Count one settled result.
    pub fn record(&mut self, result: &ScanResult) {
        self.scanned += 1;
        match result {
            ScanResult::Clean { .. } => self.clean += 1,
            ScanResult::Vulnerable { findings, .. } => {
                self.vulnerable += 1;
                self.findings += findings.len();
            }
            ScanResult::Failed { .. } => self.failed += 1,
        }
    }
}

impl Render for AuditSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let vulnerable = format!("{} vulnerable", self.vulnerable);
        let failed = format!("{} failed", self.failed);
        writeln!(
            w,
            "scanned {} projects: {} clean, {}, {}",
            self.scanned,
            self.clean,
            if self.vulnerable > 0 { vulnerable.red().to_string() } else { vulnerable },
            if self.failed > 0 { failed.yellow().to_string() } else { failed },
        )
    }
}
