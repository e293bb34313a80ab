#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{AuditError, BulkauditError, ConfigError};

// 설정
pub use config::{AuditConfig, BulkauditConfig, GeneralConfig};

// 이벤트
pub use event::ScanEvent;

// 도메인 타입
pub use types::{Finding, PATCHED_NEVER, ScanResult, VULNERABLE_ALL};
