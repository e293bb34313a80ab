//! 콘솔 보고서 -- 스캔 결과를 사람이 읽는 텍스트로 렌더링
//!
//! [`ReportFormatter`]는 결과 하나를 색상이 들어간 텍스트로 바꾸는 순수 함수입니다.
//! 취약 결과는 finding마다 두 칸짜리 표로 그립니다.
//!
//! ```text
//! (+)  1 vulnerabilities found in /srv/app
//! ┌───────────────┬──────────────────────────────────────┐
//! │               │ Regular Expression Denial of Service │
//! ├───────────────┼──────────────────────────────────────┤
//! │ Name          │ minimatch                            │
//! ├───────────────┼──────────────────────────────────────┤
//! │ Installed     │ 2.0.10                               │
//! ...
//! └───────────────┴──────────────────────────────────────┘
//! ```

use std::io::IsTerminal;

use colored::{ColoredString, Colorize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use bulkaudit_core::types::{Finding, ScanResult};

/// 왼쪽 칸 폭 (테두리 안쪽 여백 포함)
pub const LABEL_COLUMN_WIDTH: usize = 15;

/// 터미널이 아닐 때의 표 폭
pub const FALLBACK_WIDTH: usize = 80;

/// 터미널 폭에서 빼는 여유
const TERMINAL_MARGIN: usize = 10;

/// 오른쪽 칸 최소 폭
const MIN_VALUE_COLUMN_WIDTH: usize = 10;

/// 스캔 결과 포매터
#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    width: usize,
    color: bool,
}

impl ReportFormatter {
    /// 표준 출력 상태로 표 폭과 색상 사용 여부를 결정합니다.
    ///
    /// 터미널이면 `열 수 - 10`, 아니면 80이며 색상도 끕니다.
    pub fn detect() -> Self {
        let is_terminal = std::io::stdout().is_terminal();
        let width = if is_terminal {
            crossterm::terminal::size()
                .map(|(cols, _)| usize::from(cols).saturating_sub(TERMINAL_MARGIN))
                .unwrap_or(FALLBACK_WIDTH)
        } else {
            FALLBACK_WIDTH
        };
        Self::with_width(width).with_color(is_terminal)
    }

    /// 고정 폭 포매터를 생성합니다.
    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.max(LABEL_COLUMN_WIDTH + MIN_VALUE_COLUMN_WIDTH),
            color: true,
        }
    }

    /// 색상 사용 여부를 설정합니다.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// 표 전체 폭을 반환합니다.
    pub fn width(&self) -> usize {
        self.width
    }

    /// 결과 하나를 렌더링합니다. 끝에 개행은 붙지 않습니다.
    pub fn format(&self, result: &ScanResult) -> String {
        match result {
            ScanResult::Clean { project_path } => format!(
                "{} No known vulnerabilities found in {}",
                self.paint("(+)", |s| s.green()),
                project_path.display()
            ),
            ScanResult::Vulnerable {
                project_path,
                findings,
            } => {
                let mut out = format!(
                    "{} {} vulnerabilities found in {}",
                    self.paint("(+) ", |s| s.red()),
                    findings.len(),
                    project_path.display()
                );
                for finding in findings {
                    out.push('\n');
                    out.push_str(&self.finding_table(finding));
                }
                out
            }
            ScanResult::Failed {
                project_path,
                raw_error,
            } => format!(
                "{} Failed to scan {}: {}",
                self.paint("(!)", |s| s.red().bold()),
                project_path.display(),
                raw_error.trim_end()
            ),
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_owned()
        }
    }

    fn finding_table(&self, finding: &Finding) -> String {
        let vulnerable = if finding.affects_all_versions() {
            "All".into()
        } else {
            finding.vulnerable_versions()
        };
        let patched = if finding.is_unpatched() {
            "None".into()
        } else {
            finding.patched_versions()
        };
        let dependency_path = finding.path().join(" > ");

        let rows = [
            ("Name", finding.module()),
            ("Installed", finding.version()),
            ("Vulnerable", vulnerable),
            ("Patched", patched),
            ("Path", dependency_path.into()),
            ("More Info", finding.advisory()),
        ];

        let left = LABEL_COLUMN_WIDTH;
        let right = self.width - LABEL_COLUMN_WIDTH;

        let mut lines = Vec::new();
        lines.push(border('┌', '┬', '┐', left, right));
        self.push_row(&mut lines, "", &finding.title(), true);
        for (label, value) in rows {
            lines.push(border('├', '┼', '┤', left, right));
            self.push_row(&mut lines, label, &value, false);
        }
        lines.push(border('└', '┴', '┘', left, right));
        lines.join("\n")
    }

    fn push_row(&self, lines: &mut Vec<String>, label: &str, value: &str, header: bool) {
        // 테두리 안쪽 좌우 한 칸씩 여백
        let left_inner = LABEL_COLUMN_WIDTH - 2;
        let right_inner = self.width - LABEL_COLUMN_WIDTH - 2;

        let labels = wrap(label, left_inner);
        let values = wrap(value, right_inner);
        let height = labels.len().max(values.len());

        for i in 0..height {
            let l = pad(labels.get(i).map_or("", String::as_str), left_inner);
            let v = pad(values.get(i).map_or("", String::as_str), right_inner);
            let v = if header { self.paint(&v, |s| s.red()) } else { v };
            lines.push(format!("│ {l} │ {v} │"));
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::with_width(FALLBACK_WIDTH)
    }
}

fn border(start: char, mid: char, end: char, left: usize, right: usize) -> String {
    let mut line = String::with_capacity((left + right + 1) * 3);
    line.push(start);
    line.extend(std::iter::repeat_n('─', left));
    line.push(mid);
    line.extend(std::iter::repeat_n('─', right));
    line.push(end);
    line
}

/// 터미널 표시 폭 기준으로 오른쪽을 공백으로 채웁니다.
fn pad(text: &str, width: usize) -> String {
    let mut out = text.to_owned();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(text.width())));
    out
}

/// 공백 기준으로 줄을 나누고, 한 줄보다 긴 단어는 글자 단위로 자릅니다.
///
/// 폭은 모두 터미널 표시 폭(CJK 전각 문자는 2칸)으로 잽니다.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_width > 0 && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if current_width > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            // 줄마다 최소 한 글자는 들어감
            if current_width > 0 && current_width + ch_width > width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
