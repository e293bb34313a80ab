//! CLI-specific error types and exit code mapping

use bulkaudit_core::error::{AuditError, BulkauditError};
use bulkaudit_runner::AuditRunnerError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The command failed for a reason not covered below.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (current directory, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from bulkaudit-core.
    #[error("{0}")]
    Core(#[from] BulkauditError),

    /// The audit run could not be started or was interrupted.
    #[error("audit error: {0}")]
    Audit(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success (findings do not change the code) |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error / invalid parameters  |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                BulkauditError::Config(_) | BulkauditError::Audit(AuditError::InvalidParameters(_)) => 2,
                BulkauditError::Io(_) => 10,
                BulkauditError::Audit(_) => 1,
            },
            Self::JsonSerialize(_) | Self::Command(_) | Self::Audit(_) => 1,
        }
    }
}

impl From<AuditRunnerError> for CliError {
    fn from(e: AuditRunnerError) -> Self {
        match e {
            AuditRunnerError::InvalidParameters(_) | AuditRunnerError::Config { .. } => {
                Self::Config(e.to_string())
            }
            AuditRunnerError::Io { .. } => Self::Core(e.into()),
            AuditRunnerError::Channel(msg) => Self::Audit(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkaudit_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(BulkauditError::Config(ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_core_io_error() {
        let err = CliError::Core(BulkauditError::Io(std::io::Error::other("disk")));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_exit_code_core_scan_failed() {
        let err = CliError::Core(BulkauditError::Audit(AuditError::ScanFailed(
            "stream closed".to_owned(),
        )));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_runner_invalid_parameters() {
        let err: CliError = AuditRunnerError::InvalidParameters("root_path is required".to_owned()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("invalid parameters"));
    }

    #[test]
    fn test_from_runner_io_error() {
        let err: CliError = AuditRunnerError::Io {
            path: ".".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "cwd gone"),
        }
        .into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_from_runner_channel_error() {
        let err: CliError = AuditRunnerError::Channel("closed".to_owned()).into();
        assert!(matches!(err, CliError::Audit(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_error_display_config() {
        let err = CliError::Config("invalid TOML syntax".to_owned());
        let display_str = format!("{}", err);
        assert!(display_str.contains("configuration error"));
        assert!(display_str.contains("invalid TOML syntax"));
    }

    #[test]
    fn test_error_display_command() {
        let err = CliError::Command("execution failed".to_owned());
        assert_eq!(format!("{}", err), "execution failed");
    }
}
