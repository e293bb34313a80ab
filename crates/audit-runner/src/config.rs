//! 러너 설정
//!
//! [`AuditRunnerConfig`]는 core의 [`AuditConfig`](bulkaudit_core::config::AuditConfig)를
//! 러너가 바로 쓸 수 있는 형태(경로 타입, 해석된 기본값)로 옮긴 것입니다.
//!
//! # 사용 예시
//!
//! ```
//! use bulkaudit_runner::AuditRunnerConfigBuilder;
//!
//! let config = AuditRunnerConfigBuilder::new()
//!     .root_path("/srv/projects")
//!     .show_log(true)
//!     .max_concurrency(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.effective_concurrency(), 4);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use bulkaudit_core::config::{AuditConfig, MAX_CONCURRENCY_LIMIT, MAX_SCAN_TIMEOUT_SECS};

use crate::error::AuditRunnerError;

/// 스캐너 경로를 지정하지 않았을 때 현재 디렉토리 기준으로 찾는 위치
pub const DEFAULT_SCANNER_RELATIVE_PATH: &str = "node_modules/.bin/nsp";

/// 러너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRunnerConfig {
    /// 프로젝트 탐색 루트
    pub root_path: PathBuf,
    /// 결과가 나올 때마다 보고서를 출력할지 여부
    pub show_log: bool,
    /// 스캐너 실행 파일 (None이면 `<cwd>/node_modules/.bin/nsp`)
    pub scanner_path: Option<PathBuf>,
    /// 스캐너 인자
    pub scanner_args: Vec<String>,
    /// manifest 파일명
    pub manifest_name: String,
    /// 탐색하지 않을 디렉토리명
    pub exclude_dirs: Vec<String>,
    /// 최대 탐색 깊이 (None이면 무제한)
    pub max_depth: Option<usize>,
    /// 동시 실행 스캐너 수 (0이면 CPU 수)
    pub max_concurrency: usize,
    /// 스캐너 1회 실행 타임아웃 (0이면 무제한)
    pub scan_timeout_secs: u64,
}

impl Default for AuditRunnerConfig {
    fn default() -> Self {
        Self::from_core(&AuditConfig::default())
    }
}

impl AuditRunnerConfig {
    /// core의 `AuditConfig`에서 러너 설정을 생성합니다.
    ///
    /// 빈 문자열과 0은 "지정하지 않음"으로 해석합니다.
    pub fn from_core(core: &AuditConfig) -> Self {
        Self {
            root_path: PathBuf::from(&core.root_path),
            show_log: core.show_log,
            scanner_path: (!core.scanner_path.is_empty())
                .then(|| PathBuf::from(&core.scanner_path)),
            scanner_args: core.scanner_args.clone(),
            manifest_name: core.manifest_name.clone(),
            exclude_dirs: core.exclude_dirs.clone(),
            max_depth: (core.max_depth > 0).then_some(core.max_depth),
            max_concurrency: core.max_concurrency,
            scan_timeout_secs: core.scan_timeout_secs,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `root_path`: 비어 있으면 `InvalidParameters`
    /// - `manifest_name`: 비어 있지 않은 파일명
    /// - `scanner_args`: 하나 이상
    /// - `max_concurrency`: 0(자동) 또는 1-1024
    /// - `scan_timeout_secs`: 0(없음) 또는 1-86400
    pub fn validate(&self) -> Result<(), AuditRunnerError> {
        if self.root_path.as_os_str().is_empty() {
            return Err(AuditRunnerError::InvalidParameters(
                "root_path is required".to_owned(),
            ));
        }

        if self.manifest_name.is_empty() || self.manifest_name.contains(['/', '\\']) {
            return Err(AuditRunnerError::Config {
                field: "manifest_name".to_owned(),
                reason: "must be a non-empty bare file name".to_owned(),
            });
        }

        if self.scanner_args.is_empty() {
            return Err(AuditRunnerError::Config {
                field: "scanner_args".to_owned(),
                reason: "at least one scanner argument required".to_owned(),
            });
        }

        if self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(AuditRunnerError::Config {
                field: "max_concurrency".to_owned(),
                reason: format!("must be 0 (auto) or 1-{MAX_CONCURRENCY_LIMIT}"),
            });
        }

        if self.scan_timeout_secs > MAX_SCAN_TIMEOUT_SECS {
            return Err(AuditRunnerError::Config {
                field: "scan_timeout_secs".to_owned(),
                reason: format!("must be 0 (none) or 1-{MAX_SCAN_TIMEOUT_SECS}"),
            });
        }

        if let Some(scanner) = &self.scanner_path {
            if scanner.as_os_str().is_empty() {
                return Err(AuditRunnerError::Config {
                    field: "scanner_path".to_owned(),
                    reason: "must not be empty when set".to_owned(),
                });
            }
        }

        Ok(())
    }

    /// 실제로 사용할 동시 실행 수를 반환합니다.
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            return self.max_concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// 스캐너 타임아웃을 반환합니다.
    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan_timeout_secs > 0).then(|| Duration::from_secs(self.scan_timeout_secs))
    }

    /// 스캐너 실행 파일 경로를 결정합니다.
    ///
    /// 설정된 경로가 없으면 현재 디렉토리의 `node_modules/.bin/nsp`를 사용합니다.
    pub fn resolve_scanner_path(&self) -> Result<PathBuf, AuditRunnerError> {
        if let Some(path) = &self.scanner_path {
            return Ok(path.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| AuditRunnerError::Io {
            path: ".".to_owned(),
            source: e,
        })?;
        Ok(default_scanner_path(&cwd))
    }
}

/// 주어진 디렉토리 기준의 기본 스캐너 경로
pub fn default_scanner_path(base: &Path) -> PathBuf {
    base.join(DEFAULT_SCANNER_RELATIVE_PATH)
}

/// [`AuditRunnerConfig`] 빌더
#[derive(Default)]
pub struct AuditRunnerConfigBuilder {
    config: AuditRunnerConfig,
}

impl AuditRunnerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 탐색 루트를 설정합니다.
    pub fn root_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_path = path.into();
        self
    }

    /// 보고서 출력 여부를 설정합니다.
    pub fn show_log(mut self, show: bool) -> Self {
        self.config.show_log = show;
        self
    }

    /// 스캐너 실행 파일을 설정합니다.
    pub fn scanner_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scanner_path = Some(path.into());
        self
    }

    /// 스캐너 인자를 설정합니다.
    pub fn scanner_args(mut self, args: Vec<String>) -> Self {
        self.config.scanner_args = args;
        self
    }

    /// manifest 파일명을 설정합니다.
    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.config.manifest_name = name.into();
        self
    }

    /// 제외 디렉토리 목록을 설정합니다.
    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.config.exclude_dirs = dirs;
        self
    }

    /// 최대 탐색 깊이를 설정합니다.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// 동시 실행 수를 설정합니다.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.config.max_concurrency = n;
        self
    }

    /// 스캐너 타임아웃(초)을 설정합니다.
    pub fn scan_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scan_timeout_secs = secs;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// - 루트 경로 누락 시 `AuditRunnerError::InvalidParameters`
    /// - 그 밖의 검증 실패 시 `AuditRunnerError::Config`
    pub fn build(self) -> Result<AuditRunnerConfig, AuditRunnerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
