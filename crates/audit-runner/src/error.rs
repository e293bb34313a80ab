//! 러너 에러 타입
//!
//! [`AuditRunnerError`]는 러너 구성 및 실행 시작 단계에서 발생하는 에러입니다.
//! 프로젝트 단위 스캔 실패는 에러가 아니라 `ScanResult::Failed`로 표현되어
//! 이벤트 스트림의 `Error` 채널로 전달됩니다.
//!
//! # 에러 카테고리
//!
//! - **파라미터 누락**: `InvalidParameters` (루트 경로 없음)
//! - **설정**: `Config`
//! - **파일 I/O**: `Io` (현재 디렉토리 확인 실패 등)
//! - **채널 통신**: `Channel` (이벤트 스트림이 `End` 없이 닫힘)

use bulkaudit_core::error::{AuditError, BulkauditError, ConfigError};

/// 러너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AuditRunnerError {
    /// 필수 파라미터 누락
    #[error("BULKAUDIT: invalid parameters: {0}")]
    InvalidParameters(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<AuditRunnerError> for BulkauditError {
    fn from(err: AuditRunnerError) -> Self {
        match err {
            AuditRunnerError::InvalidParameters(msg) => {
                BulkauditError::Audit(AuditError::InvalidParameters(msg))
            }
            AuditRunnerError::Config { field, reason } => {
                BulkauditError::Config(ConfigError::InvalidValue { field, reason })
            }
            AuditRunnerError::Io { path, source } => BulkauditError::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            AuditRunnerError::Channel(msg) => BulkauditError::Audit(AuditError::ScanFailed(msg)),
        }
    }
}
