//! 스캔 이벤트 -- 러너가 발행하는 세 가지 신호
//!
//! [`ScanEvent`]는 fan-out 코디네이터가 스트림으로 내보내는 단위입니다.
//!
//! - `Data`: `Clean` 또는 `Vulnerable` 결과
//! - `Error`: `Failed` 결과
//! - `End`: 모든 프로젝트의 결과가 발행된 뒤 정확히 한 번

use std::fmt;

use crate::types::ScanResult;

/// 이벤트 타입 상수: data
pub const EVENT_TYPE_DATA: &str = "data";
/// 이벤트 타입 상수: error
pub const EVENT_TYPE_ERROR: &str = "error";
/// 이벤트 타입 상수: end
pub const EVENT_TYPE_END: &str = "end";

/// 코디네이터가 발행하는 스캔 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// 성공적으로 분류된 결과 (`Clean` / `Vulnerable`)
    Data(ScanResult),
    /// 분류에 실패한 결과 (`Failed`)
    Error(ScanResult),
    /// 완료 신호 (항상 마지막 이벤트)
    End,
}

impl ScanEvent {
    /// 결과의 형태에 따라 `Data` 또는 `Error` 채널로 분류합니다.
    pub fn from_result(result: ScanResult) -> Self {
        if result.is_failed() {
            Self::Error(result)
        } else {
            Self::Data(result)
        }
    }

    /// 이벤트 타입 문자열을 반환합니다.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Data(_) => EVENT_TYPE_DATA,
            Self::Error(_) => EVENT_TYPE_ERROR,
            Self::End => EVENT_TYPE_END,
        }
    }

    /// 이벤트가 담고 있는 결과 (`End`는 없음)
    pub fn result(&self) -> Option<&ScanResult> {
        match self {
            Self::Data(result) | Self::Error(result) => Some(result),
            Self::End => None,
        }
    }

    /// 결과를 소유권과 함께 꺼냅니다.
    pub fn into_result(self) -> Option<ScanResult> {
        match self {
            Self::Data(result) | Self::Error(result) => Some(result),
            Self::End => None,
        }
    }

    /// 완료 신호인지 여부
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(result) | Self::Error(result) => {
                write!(f, "ScanEvent[{}] {}", self.event_type(), result)
            }
            Self::End => write!(f, "ScanEvent[end]"),
        }
    }
}
