//! 스캐너 실행 -- 프로젝트 하나에 대해 외부 스캐너를 돌리고 결과를 분류
//!
//! [`ScanInvoker`] trait은 프로젝트 디렉토리 하나를 받아 [`ScanResult`]를 돌려주는
//! 인터페이스입니다. 실패도 에러가 아니라 `ScanResult::Failed`로 표현되므로
//! 호출자는 항상 결과 하나를 받습니다.
//!
//! # 분류 규칙
//!
//! | 종료 상태 | 에러 스트림 | 결과 |
//! |-----------|-------------|------|
//! | 0 | (무시) | `Clean` |
//! | 0 이외 | finding JSON 배열 | `Vulnerable` |
//! | 0 이외 | 그 밖의 내용 | `Failed` (원문 보존) |
//! | 실행 불가 / 타임아웃 | - | `Failed` (사유) |

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use bulkaudit_core::types::{Finding, ScanResult};

use crate::config::AuditRunnerConfig;
use crate::error::AuditRunnerError;

/// 프로젝트 단위 스캐너 실행기
pub trait ScanInvoker: Send + Sync + 'static {
    /// `project_path`에서 스캐너를 실행하고 결과를 분류합니다.
    ///
    /// 어떤 경우에도 패닉하거나 에러를 반환하지 않고 결과 하나로 귀결됩니다.
    fn invoke(&self, project_path: &Path) -> impl Future<Output = ScanResult> + Send;
}

/// 스캐너 종료 상태와 에러 스트림으로 결과를 분류합니다.
pub fn classify(project_path: &Path, success: bool, stderr: &str) -> ScanResult {
    let project_path = project_path.to_path_buf();

    if success {
        return ScanResult::Clean { project_path };
    }

    match serde_json::from_str::<Vec<Finding>>(stderr) {
        Ok(findings) => ScanResult::Vulnerable {
            project_path,
            findings,
        },
        Err(e) => {
            debug!(
                project = %project_path.display(),
                error = %e,
                "scanner output is not a findings report"
            );
            ScanResult::Failed {
                project_path,
                raw_error: stderr.to_owned(),
            }
        }
    }
}

/// 하위 프로세스로 스캐너를 실행하는 기본 구현
///
/// 명령은 셸을 거치지 않고 `<scanner_path> <args...>`로 직접 실행됩니다.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    /// 스캐너 실행 파일
    scanner_path: PathBuf,
    /// 스캐너 인자
    args: Vec<String>,
    /// 1회 실행 타임아웃
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    /// 기본 인자(`check --output json`)로 실행기를 생성합니다.
    pub fn new(scanner_path: impl Into<PathBuf>) -> Self {
        Self {
            scanner_path: scanner_path.into(),
            args: vec!["check".to_owned(), "--output".to_owned(), "json".to_owned()],
            timeout: None,
        }
    }

    /// 러너 설정에서 실행기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 스캐너 경로가 설정되지 않았고 현재 디렉토리도 확인할 수 없으면
    /// `AuditRunnerError::Io`를 반환합니다.
    pub fn from_config(config: &AuditRunnerConfig) -> Result<Self, AuditRunnerError> {
        Ok(Self {
            scanner_path: config.resolve_scanner_path()?,
            args: config.scanner_args.clone(),
            timeout: config.scan_timeout(),
        })
    }

    /// 스캐너 인자를 설정합니다.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 스캐너 실행 파일 경로를 반환합니다.
    pub fn scanner_path(&self) -> &Path {
        &self.scanner_path
    }

    /// 스캐너 인자를 반환합니다.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn failed(project_path: &Path, reason: String) -> ScanResult {
        ScanResult::Failed {
            project_path: project_path.to_path_buf(),
            raw_error: reason,
        }
    }
}

impl ScanInvoker for ProcessInvoker {
    async fn invoke(&self, project_path: &Path) -> ScanResult {
        let mut cmd = Command::new(&self.scanner_path);
        cmd.args(&self.args)
            .current_dir(project_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            project = %project_path.display(),
            scanner = %self.scanner_path.display(),
            "spawning scanner"
        );

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(output) => output,
                Err(_) => {
                    return Self::failed(
                        project_path,
                        format!("scanner timed out after {limit:?}"),
                    );
                }
            },
            None => cmd.output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return Self::failed(
                    project_path,
                    format!(
                        "failed to run scanner {}: {e}",
                        self.scanner_path.display()
                    ),
                );
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && stderr.trim().is_empty() {
            return Self::failed(
                project_path,
                format!("scanner exited with {} and no output", output.status),
            );
        }

        classify(project_path, output.status.success(), &stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"[{"id":118,"module":"minimatch","version":"2.0.10","vulnerable_versions":"<=3.0.1","patched_versions":">=3.0.2","title":"Regular Expression Denial of Service","path":["test-project@0.0.1","minimatch@2.0.10"],"advisory":"https://nodesecurity.io/advisories/118"}]"#;

    #[test]
    fn success_is_clean_regardless_of_output() {
        let result = classify(Path::new("/dummy/folderA"), true, "garbage");
        assert_eq!(
            result,
            ScanResult::Clean {
                project_path: PathBuf::from("/dummy/folderA")
            }
        );
    }

    #[test]
    fn failure_with_report_is_vulnerable() {
        let result = classify(Path::new("/dummy/folderA"), false, REPORT);
        assert!(result.is_vulnerable());
        let expected: serde_json::Value = serde_json::from_str(REPORT).unwrap();
        assert_eq!(serde_json::to_value(result.findings()).unwrap(), expected);
    }

    #[test]
    fn failure_with_null_and_empty_fields_keeps_findings_exactly() {
        let report = r#"[{"id":118,"module":"minimatch","version":"2.0.10","vulnerable_versions":"<=3.0.1","patched_versions":null,"title":"","path":[],"advisory":null,"cvss_score":7.5}]"#;
        let result = classify(Path::new("/dummy/folderA"), false, report);
        assert!(result.is_vulnerable(), "got {}", result.outcome());
        let expected: serde_json::Value = serde_json::from_str(report).unwrap();
        assert_eq!(serde_json::to_value(result.findings()).unwrap(), expected);
    }

    #[test]
    fn failure_with_empty_array_is_vulnerable_without_findings() {
        let result = classify(Path::new("/p"), false, "[]");
        assert!(result.is_vulnerable());
        assert!(result.findings().is_empty());
    }

    #[test]
    fn failure_with_garbage_is_failed_with_raw_text() {
        let result = classify(Path::new("/dummy/folderA"), false, "DUMMY-ERROR");
        assert_eq!(
            result,
            ScanResult::Failed {
                project_path: PathBuf::from("/dummy/folderA"),
                raw_error: "DUMMY-ERROR".to_owned(),
            }
        );
    }

    #[test]
    fn failure_with_truncated_array_is_failed() {
        let truncated = r#"{"id":118,"module":"minimatch"}]"#;
        let result = classify(Path::new("/p"), false, truncated);
        assert!(result.is_failed());
    }

    #[test]
    fn failure_with_json_object_is_failed() {
        let result = classify(Path::new("/p"), false, r#"{"message":"rate limited"}"#);
        assert!(result.is_failed());
    }

    #[test]
    fn process_invoker_defaults() {
        let invoker = ProcessInvoker::new("/opt/nsp");
        assert_eq!(invoker.scanner_path(), Path::new("/opt/nsp"));
        assert_eq!(invoker.args(), ["check", "--output", "json"]);
    }

    #[tokio::test]
    async fn missing_scanner_resolves_to_failed() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ProcessInvoker::new("/nonexistent/bulkaudit/scanner");
        let result = invoker.invoke(dir.path()).await;
        match result {
            ScanResult::Failed { raw_error, .. } => {
                assert!(raw_error.contains("failed to run scanner"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
