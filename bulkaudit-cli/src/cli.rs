//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Bulkaudit -- run a dependency-vulnerability scanner across every project under a directory.
///
/// Every directory containing a `package.json` is scanned with
/// `node_modules/.bin/nsp check --output json`, several projects at a time.
#[derive(Parser, Debug)]
#[command(name = "bulkaudit", version, about, long_about = None)]
pub struct Cli {
    /// Root directory to search for projects (default: current directory).
    pub root: Option<PathBuf>,

    /// Print a formatted report for each project as its scan finishes.
    #[arg(short, long)]
    pub show_log: bool,

    /// Path to the bulkaudit.toml configuration file.
    #[arg(short, long, default_value = "bulkaudit.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Maximum number of scanner processes running at once.
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable reports (with --show-log) and a summary line.
    Text,
    /// One JSON result object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["bulkaudit"]).expect("parse succeeded");
        assert!(cli.root.is_none(), "root should default to None");
        assert!(!cli.show_log, "show_log should default to false");
        assert_eq!(cli.config, PathBuf::from("bulkaudit.toml"));
        assert!(cli.log_level.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.jobs.is_none());
    }

    #[test]
    fn test_cli_parse_show_log_short() {
        let cli = Cli::try_parse_from(["bulkaudit", "-s"]).expect("parse succeeded");
        assert!(cli.show_log, "-s should enable show_log");
    }

    #[test]
    fn test_cli_parse_show_log_long() {
        let cli = Cli::try_parse_from(["bulkaudit", "--show-log"]).expect("parse succeeded");
        assert!(cli.show_log, "--show-log should enable show_log");
    }

    #[test]
    fn test_cli_parse_root_path() {
        let cli = Cli::try_parse_from(["bulkaudit", "/srv/projects"]).expect("parse succeeded");
        assert_eq!(cli.root, Some(PathBuf::from("/srv/projects")));
    }

    #[test]
    fn test_cli_parse_all_options() {
        let cli = Cli::try_parse_from([
            "bulkaudit",
            "-s",
            "-c",
            "/etc/bulkaudit.toml",
            "--log-level",
            "debug",
            "--output",
            "json",
            "-j",
            "4",
            "/srv",
        ])
        .expect("parse succeeded");

        assert!(cli.show_log);
        assert_eq!(cli.config, PathBuf::from("/etc/bulkaudit.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.jobs, Some(4));
        assert_eq!(cli.root, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        let args = Cli::try_parse_from(["bulkaudit", "--output", "xml"]);
        assert!(args.is_err(), "xml is not a supported output format");
    }

    #[test]
    fn test_cli_parse_invalid_jobs() {
        let args = Cli::try_parse_from(["bulkaudit", "-j", "many"]);
        assert!(args.is_err(), "jobs must be a number");
    }

    #[test]
    fn test_cli_rejects_subcommands() {
        let args = Cli::try_parse_from(["bulkaudit", "/srv", "extra"]);
        assert!(args.is_err(), "only one positional root is accepted");
    }

    #[test]
    fn test_cli_version_flag() {
        let err = Cli::try_parse_from(["bulkaudit", "-V"]).expect_err("version exits early");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
