//! 메트릭 이름 상수
//!
//! 러너는 `metrics` facade의 `counter!()`, `gauge!()`, `histogram!()` 매크로로
//! 아래 이름을 기록합니다. exporter 설치는 바이너리의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `bulkaudit_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)

/// 결과 레이블 키 (clean, vulnerable, failed)
pub const LABEL_RESULT: &str = "result";

/// Runner: 완료된 스캔 수 (counter, label: result)
pub const RUNNER_SCANS_TOTAL: &str = "bulkaudit_runner_scans_total";

/// Runner: 보고된 취약점 수 (counter)
pub const RUNNER_FINDINGS_TOTAL: &str = "bulkaudit_runner_findings_total";

/// Runner: 실행 중인 스캐너 프로세스 수 (gauge)
pub const RUNNER_SCANS_IN_FLIGHT: &str = "bulkaudit_runner_scans_in_flight";

/// Runner: 스캐너 1회 실행 시간 (histogram, 초)
pub const RUNNER_SCAN_DURATION_SECONDS: &str = "bulkaudit_runner_scan_duration_seconds";
