//! 설정 관리 -- bulkaudit.toml 파싱 및 런타임 설정
//!
//! [`BulkauditConfig`]는 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`BULKAUDIT_AUDIT_MAX_CONCURRENCY=4` 형식)
//! 3. 설정 파일 (`bulkaudit.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), bulkaudit_core::error::BulkauditError> {
//! use bulkaudit_core::config::BulkauditConfig;
//!
//! // 파일이 없으면 기본값 + 환경변수 오버라이드
//! let config = BulkauditConfig::load_or_default("bulkaudit.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = BulkauditConfig::parse("[audit]\nshow_log = true")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BulkauditError, ConfigError};

/// 동시 실행 상한
pub const MAX_CONCURRENCY_LIMIT: usize = 1024;

/// 스캔 타임아웃 상한 (초)
pub const MAX_SCAN_TIMEOUT_SECS: u64 = 86_400;

/// bulkaudit 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkauditConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 감사 실행 설정
    #[serde(default)]
    pub audit: AuditConfig,
}

impl BulkauditConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BulkauditError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값을 사용하는 [`load`](Self::load)입니다.
    ///
    /// 파일이 존재하지만 파싱에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, BulkauditError> {
        let mut config = match Self::from_file(path.as_ref()).await {
            Ok(config) => config,
            Err(BulkauditError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(
                    path = %path.as_ref().display(),
                    "config file not found, using defaults"
                );
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BulkauditError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BulkauditError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BulkauditError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BulkauditError> {
        toml::from_str(toml_str).map_err(|e| {
            BulkauditError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `BULKAUDIT_{SECTION}_{FIELD}`
    /// 예: `BULKAUDIT_AUDIT_SHOW_LOG=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "BULKAUDIT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BULKAUDIT_GENERAL_LOG_FORMAT");

        // Audit
        override_string(&mut self.audit.root_path, "BULKAUDIT_AUDIT_ROOT_PATH");
        override_bool(&mut self.audit.show_log, "BULKAUDIT_AUDIT_SHOW_LOG");
        override_string(&mut self.audit.scanner_path, "BULKAUDIT_AUDIT_SCANNER_PATH");
        override_args(&mut self.audit.scanner_args, "BULKAUDIT_AUDIT_SCANNER_ARGS");
        override_string(&mut self.audit.manifest_name, "BULKAUDIT_AUDIT_MANIFEST_NAME");
        override_csv(&mut self.audit.exclude_dirs, "BULKAUDIT_AUDIT_EXCLUDE_DIRS");
        override_usize(&mut self.audit.max_depth, "BULKAUDIT_AUDIT_MAX_DEPTH");
        override_usize(
            &mut self.audit.max_concurrency,
            "BULKAUDIT_AUDIT_MAX_CONCURRENCY",
        );
        override_u64(
            &mut self.audit.scan_timeout_secs,
            "BULKAUDIT_AUDIT_SCAN_TIMEOUT_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// `root_path`는 여기서 검사하지 않습니다. CLI가 위치 인자나 현재 디렉토리로
    /// 채우며, 비어 있으면 러너가 실행 시점에 거부합니다.
    pub fn validate(&self) -> Result<(), BulkauditError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.audit.validate()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 감사 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// 프로젝트 탐색 루트 디렉토리
    pub root_path: String,
    /// 결과를 콘솔에 출력할지 여부
    pub show_log: bool,
    /// 스캐너 실행 파일 경로 (비어 있으면 `<cwd>/node_modules/.bin/nsp`)
    pub scanner_path: String,
    /// 스캐너 인자
    pub scanner_args: Vec<String>,
    /// 프로젝트를 식별하는 manifest 파일명
    pub manifest_name: String,
    /// 탐색에서 제외할 디렉토리명
    pub exclude_dirs: Vec<String>,
    /// 최대 탐색 깊이 (0이면 무제한)
    pub max_depth: usize,
    /// 동시에 실행할 스캐너 수 (0이면 CPU 수)
    pub max_concurrency: usize,
    /// 스캐너 1회 실행 타임아웃 (0이면 무제한)
    pub scan_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            show_log: false,
            scanner_path: String::new(),
            scanner_args: vec!["check".to_owned(), "--output".to_owned(), "json".to_owned()],
            manifest_name: "package.json".to_owned(),
            exclude_dirs: vec!["node_modules".to_owned(), ".git".to_owned()],
            max_depth: 0,
            max_concurrency: 0,
            scan_timeout_secs: 0,
        }
    }
}

impl AuditConfig {
    /// `[audit]` 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BulkauditError> {
        if self.manifest_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "audit.manifest_name".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.manifest_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "audit.manifest_name".to_owned(),
                reason: "must be a bare file name".to_owned(),
            }
            .into());
        }

        if self.scanner_args.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "audit.scanner_args".to_owned(),
                reason: "at least one scanner argument required".to_owned(),
            }
            .into());
        }

        if self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "audit.max_concurrency".to_owned(),
                reason: format!("must be 0 (auto) or 1-{MAX_CONCURRENCY_LIMIT}"),
            }
            .into());
        }

        if self.scan_timeout_secs > MAX_SCAN_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "audit.scan_timeout_secs".to_owned(),
                reason: format!("must be 0 (none) or 1-{MAX_SCAN_TIMEOUT_SECS}"),
            }
            .into());
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// 스캐너 인자는 공백으로 구분합니다 (셸 인용은 지원하지 않음).
fn override_args(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split_whitespace().map(str::to_owned).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = BulkauditConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(!config.audit.show_log);
        assert_eq!(config.audit.manifest_name, "package.json");
        assert_eq!(config.audit.scanner_args, vec!["check", "--output", "json"]);
        assert!(config.audit.exclude_dirs.contains(&"node_modules".to_owned()));
    }

    #[test]
    fn default_config_passes_validation() {
        BulkauditConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = BulkauditConfig::parse("").unwrap();
        assert_eq!(config.audit.manifest_name, "package.json");
        assert_eq!(config.audit.max_concurrency, 0);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[audit]
show_log = true
max_concurrency = 8
"#;
        let config = BulkauditConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.audit.show_log);
        assert_eq!(config.audit.max_concurrency, 8);
        assert_eq!(config.audit.manifest_name, "package.json");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = BulkauditConfig::parse("[audit\nshow_log = ").unwrap_err();
        assert!(matches!(
            err,
            BulkauditError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = BulkauditConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = BulkauditConfig::default();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_manifest_with_separator() {
        let mut config = BulkauditConfig::default();
        config.audit.manifest_name = "sub/package.json".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("manifest_name"));
    }

    #[test]
    fn validate_rejects_empty_scanner_args() {
        let mut config = BulkauditConfig::default();
        config.audit.scanner_args.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_concurrency() {
        let mut config = BulkauditConfig::default();
        config.audit.max_concurrency = MAX_CONCURRENCY_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_timeout() {
        let mut config = BulkauditConfig::default();
        config.audit.scan_timeout_secs = MAX_SCAN_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트 전용 키이며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_BULKAUDIT_STR", "overridden") };
        override_string(&mut val, "TEST_BULKAUDIT_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_BULKAUDIT_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트 전용 키이며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_BULKAUDIT_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_BULKAUDIT_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_BULKAUDIT_BOOL_BAD") };
    }

    #[test]
    fn env_override_csv_drops_empty_items() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: 테스트 전용 키이며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_BULKAUDIT_CSV", "vendor, ,dist") };
        override_csv(&mut val, "TEST_BULKAUDIT_CSV");
        assert_eq!(val, vec!["vendor", "dist"]);
        unsafe { std::env::remove_var("TEST_BULKAUDIT_CSV") };
    }

    #[test]
    fn env_override_args_splits_on_whitespace() {
        let mut val = Vec::new();
        // SAFETY: 테스트 전용 키이며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_BULKAUDIT_ARGS", "audit  --json") };
        override_args(&mut val, "TEST_BULKAUDIT_ARGS");
        assert_eq!(val, vec!["audit", "--json"]);
        unsafe { std::env::remove_var("TEST_BULKAUDIT_ARGS") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 4usize;
        override_usize(&mut val, "TEST_BULKAUDIT_NONEXISTENT_12345");
        assert_eq!(val, 4);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = BulkauditConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = BulkauditConfig::parse(&toml_str).unwrap();
        assert_eq!(config.audit.scanner_args, parsed.audit.scanner_args);
        assert_eq!(config.audit.exclude_dirs, parsed.audit.exclude_dirs);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = BulkauditConfig::from_file("/nonexistent/path/bulkaudit.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BulkauditError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
