//! 프로젝트 탐색 -- manifest 파일이 있는 디렉토리 스트리밍
//!
//! [`ProjectSource`] trait은 루트 디렉토리 아래의 스캔 대상 프로젝트 경로를
//! 채널로 흘려보내는 인터페이스입니다. [`ManifestDiscoverer`]는 `walkdir`로
//! 트리를 순회하여 manifest 파일(기본 `package.json`)의 부모 디렉토리를 내보냅니다.
//!
//! 순회는 blocking I/O이므로 `spawn_blocking` 스레드에서 수행되며, 채널 용량이
//! 가득 차면 순회도 멈춥니다.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::AuditRunnerConfig;

/// 탐색 채널 기본 용량
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// 스캔 대상 프로젝트 경로 공급자
///
/// 반환된 채널이 닫히면 탐색이 끝난 것입니다.
pub trait ProjectSource: Send + Sync + 'static {
    /// `root` 아래의 프로젝트 디렉토리를 발견되는 대로 보냅니다.
    ///
    /// tokio 런타임 안에서 호출되어야 합니다.
    fn discover(&self, root: &Path) -> mpsc::Receiver<PathBuf>;
}

/// manifest 파일 기반 프로젝트 탐색기
#[derive(Debug, Clone)]
pub struct ManifestDiscoverer {
    /// 프로젝트를 식별하는 파일명
    manifest_name: String,
    /// 내려가지 않을 디렉토리명
    exclude_dirs: Vec<String>,
    /// 최대 깊이 (manifest 파일 기준, 루트 = 0)
    max_depth: Option<usize>,
    /// 탐색 채널 용량
    channel_capacity: usize,
}

impl ManifestDiscoverer {
    /// 제외 디렉토리 없이 탐색기를 생성합니다.
    pub fn new(manifest_name: impl Into<String>) -> Self {
        Self {
            manifest_name: manifest_name.into(),
            exclude_dirs: Vec::new(),
            max_depth: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// 러너 설정으로 탐색기를 생성합니다.
    pub fn from_config(config: &AuditRunnerConfig) -> Self {
        Self {
            manifest_name: config.manifest_name.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
            max_depth: config.max_depth,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// 제외 디렉토리를 설정합니다.
    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    /// 최대 깊이를 설정합니다.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// 탐색 채널 용량을 설정합니다.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// manifest 파일명을 반환합니다.
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    fn is_excluded(&self, name: &OsStr) -> bool {
        self.exclude_dirs.iter().any(|d| name == d.as_str())
    }

    /// 트리를 동기적으로 순회하며 발견한 프로젝트마다 `on_project`를 호출합니다.
    ///
    /// `on_project`가 `false`를 반환하면 순회를 중단합니다.
    /// 반환값은 발견한 프로젝트 수입니다.
    pub fn walk(&self, root: &Path, mut on_project: impl FnMut(PathBuf) -> bool) -> usize {
        if !root.exists() {
            warn!(root = %root.display(), "root directory does not exist");
            return 0;
        }

        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let entries = walker.into_iter().filter_entry(|entry| {
            !(entry.depth() > 0 && entry.file_type().is_dir() && self.is_excluded(entry.file_name()))
        });

        let mut found = 0;
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to read directory entry, skipping");
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != self.manifest_name.as_str() {
                continue;
            }

            let Some(project) = entry.path().parent() else {
                continue;
            };

            found += 1;
            debug!(project = %project.display(), "project discovered");

            if !on_project(project.to_path_buf()) {
                debug!("project receiver closed, stopping discovery");
                break;
            }
        }

        found
    }
}

impl Default for ManifestDiscoverer {
    fn default() -> Self {
        Self::new("package.json")
            .with_exclude_dirs(vec!["node_modules".to_owned(), ".git".to_owned()])
    }
}

impl ProjectSource for ManifestDiscoverer {
    fn discover(&self, root: &Path) -> mpsc::Receiver<PathBuf> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let discoverer = self.clone();
        let root = root.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let found = discoverer.walk(&root, |project| tx.blocking_send(project).is_ok());
            debug!(root = %root.display(), found, "discovery finished");
        });

        rx
    }
}
