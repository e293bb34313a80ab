//! 도메인 타입 -- 프로젝트 단위 스캔 결과
//!
//! [`ScanResult`]는 하나의 프로젝트 디렉토리에 대해 외부 스캐너를 실행한 결과이며,
//! 세 가지 형태(`Clean`, `Vulnerable`, `Failed`) 중 정확히 하나입니다.
//! [`Finding`]은 스캐너가 보고한 단일 취약점입니다.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// "모든 버전이 취약함"을 뜻하는 스캐너의 vulnerable range 값
pub const VULNERABLE_ALL: &str = "<=99.999.99999";

/// "패치된 버전 없음"을 뜻하는 스캐너의 patched range 값
pub const PATCHED_NEVER: &str = "<0.0.0";

/// 스캐너가 보고한 단일 취약점
///
/// 스캐너가 준 JSON 객체를 필드 하나 바꾸지 않고 그대로 보관합니다.
/// `null`이거나 문자열이 아닌 필드도 파싱을 막지 않으며, 직렬화하면
/// 빈 문자열이나 빈 배열까지 원본과 같은 객체가 나옵니다.
/// 보고서에 쓰이는 필드는 접근자로 읽습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Finding(serde_json::Map<String, serde_json::Value>);

impl Finding {
    /// 취약점 제목
    pub fn title(&self) -> Cow<'_, str> {
        self.text("title")
    }

    /// 영향받는 모듈명
    pub fn module(&self) -> Cow<'_, str> {
        self.text("module")
    }

    /// 설치된 버전
    pub fn version(&self) -> Cow<'_, str> {
        self.text("version")
    }

    /// 취약한 버전 범위
    pub fn vulnerable_versions(&self) -> Cow<'_, str> {
        self.text("vulnerable_versions")
    }

    /// 패치된 버전 범위
    pub fn patched_versions(&self) -> Cow<'_, str> {
        self.text("patched_versions")
    }

    /// advisory 링크
    pub fn advisory(&self) -> Cow<'_, str> {
        self.text("advisory")
    }

    /// 루트 프로젝트부터 취약 모듈까지의 의존성 경로 (`name@version`)
    ///
    /// 배열이 아닌 문자열 하나는 한 칸짜리 경로로 취급합니다.
    pub fn path(&self) -> Vec<Cow<'_, str>> {
        match self.0.get("path") {
            Some(serde_json::Value::Array(items)) => items.iter().map(value_text).collect(),
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(other) => vec![value_text(other)],
        }
    }

    /// 임의 필드의 원본 값
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// 스캐너가 준 필드 전체
    pub fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    /// 모든 버전이 취약한지 여부
    pub fn affects_all_versions(&self) -> bool {
        self.vulnerable_versions() == VULNERABLE_ALL
    }

    /// 패치 버전이 존재하지 않는지 여부
    pub fn is_unpatched(&self) -> bool {
        self.patched_versions() == PATCHED_NEVER
    }

    fn text(&self, key: &str) -> Cow<'_, str> {
        self.0.get(key).map_or(Cow::Borrowed(""), value_text)
    }
}

/// 표시용 텍스트 -- 문자열은 그대로, `null`은 빈 문자열, 나머지는 JSON 표기
fn value_text(value: &serde_json::Value) -> Cow<'_, str> {
    match value {
        serde_json::Value::String(s) => Cow::Borrowed(s),
        serde_json::Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Finding {
    fn from(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}: {}", self.module(), self.version(), self.title())
    }
}

/// 프로젝트 단위 스캔 결과
///
/// 발견된 프로젝트 경로마다 정확히 하나가 생성되며, 생성 이후 변경되지 않습니다.
///
/// # 직렬화 형태
///
/// - `Clean` → `{"projectPath": "...", "isVulnerable": false}`
/// - `Vulnerable` → `{"projectPath": "...", "isVulnerable": true, "result": [...]}`
/// - `Failed` → `{"projectPath": "...", "error": "..."}`
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    /// 스캐너가 0으로 종료 (알려진 취약점 없음)
    Clean {
        /// 프로젝트 디렉토리
        project_path: PathBuf,
    },
    /// 스캐너가 파싱 가능한 취약점 보고서를 출력
    Vulnerable {
        /// 프로젝트 디렉토리
        project_path: PathBuf,
        /// 보고된 취약점 (스캐너 출력 순서 유지)
        findings: Vec<Finding>,
    },
    /// 스캐너 출력을 보고서로 해석할 수 없음
    Failed {
        /// 프로젝트 디렉토리
        project_path: PathBuf,
        /// 스캐너 에러 스트림 원문 (또는 실행 실패 사유)
        raw_error: String,
    },
}

impl ScanResult {
    /// 결과가 속한 프로젝트 경로를 반환합니다.
    pub fn project_path(&self) -> &Path {
        match self {
            Self::Clean { project_path }
            | Self::Vulnerable { project_path, .. }
            | Self::Failed { project_path, .. } => project_path,
        }
    }

    /// 취약점이 보고되었는지 여부
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Self::Vulnerable { .. })
    }

    /// 스캔 자체가 실패했는지 여부
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// 보고된 취약점 목록 (없으면 빈 슬라이스)
    pub fn findings(&self) -> &[Finding] {
        match self {
            Self::Vulnerable { findings, .. } => findings,
            _ => &[],
        }
    }

    /// 메트릭/로그용 결과 레이블
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Clean { .. } => "clean",
            Self::Vulnerable { .. } => "vulnerable",
            Self::Failed { .. } => "failed",
        }
    }
}

impl Serialize for ScanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let project_path = self.project_path().to_string_lossy();
        match self {
            Self::Clean { .. } => {
                let mut state = serializer.serialize_struct("ScanResult", 2)?;
                state.serialize_field("projectPath", &project_path)?;
                state.serialize_field("isVulnerable", &false)?;
                state.end()
            }
            Self::Vulnerable { findings, .. } => {
                let mut state = serializer.serialize_struct("ScanResult", 3)?;
                state.serialize_field("projectPath", &project_path)?;
                state.serialize_field("isVulnerable", &true)?;
                state.serialize_field("result", findings)?;
                state.end()
            }
            Self::Failed { raw_error, .. } => {
                let mut state = serializer.serialize_struct("ScanResult", 2)?;
                state.serialize_field("projectPath", &project_path)?;
                state.serialize_field("error", raw_error)?;
                state.end()
            }
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean { project_path } => write!(f, "clean: {}", project_path.display()),
            Self::Vulnerable {
                project_path,
                findings,
            } => write!(
                f,
                "vulnerable ({} findings): {}",
                findings.len(),
                project_path.display()
            ),
            Self::Failed { project_path, .. } => write!(f, "failed: {}", project_path.display()),
        }
    }
}
