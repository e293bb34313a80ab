#![doc = include_str!("../README.md")]

pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod invoker;
pub mod report;
pub mod stream;

pub use config::{AuditRunnerConfig, AuditRunnerConfigBuilder};
pub use coordinator::{AuditCoordinator, AuditCoordinatorBuilder};
pub use discovery::{ManifestDiscoverer, ProjectSource};
pub use error::AuditRunnerError;
pub use invoker::{ProcessInvoker, ScanInvoker, classify};
pub use report::ReportFormatter;
pub use stream::ScanStream;

/// 기본 구성(manifest 탐색 + 하위 프로세스 스캐너 + 표준 출력 보고서)으로 스캔을 시작합니다.
///
/// 파라미터 검증과 스캐너 경로 결정은 호출 시점에 동기적으로 수행되며,
/// 그 이후의 프로젝트 단위 실패는 모두 스트림의 `Error` 이벤트로 전달됩니다.
///
/// # Errors
///
/// - 루트 경로가 비어 있으면 `AuditRunnerError::InvalidParameters`
/// - 설정 값이 잘못되었으면 `AuditRunnerError::Config`
/// - 기본 스캐너 경로를 위한 현재 디렉토리를 확인할 수 없으면 `AuditRunnerError::Io`
pub fn run(config: &AuditRunnerConfig) -> Result<ScanStream, AuditRunnerError> {
    config.validate()?;

    let coordinator = AuditCoordinatorBuilder::new()
        .config(config.clone())
        .source(ManifestDiscoverer::from_config(config))
        .invoker(ProcessInvoker::from_config(config)?)
        .build()?;

    Ok(coordinator.run())
}
