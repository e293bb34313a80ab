//! 에러 타입 -- 도메인별 에러 정의

/// bulkaudit 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BulkauditError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 감사 실행 에러
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 감사 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// 실행 파라미터 누락 (루트 경로 등)
    #[error("BULKAUDIT: invalid parameters: {0}")]
    InvalidParameters(String),

    /// 감사 실행 실패
    #[error("audit failed: {0}")]
    ScanFailed(String),
}
