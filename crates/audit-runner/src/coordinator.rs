//! Fan-out 코디네이터 -- 탐색된 프로젝트마다 스캐너를 실행하고 결과를 이벤트로 발행
//!
//! [`AuditCoordinator`]는 [`ProjectSource`]가 흘려보내는 경로를 받아
//! [`ScanInvoker`]를 병렬로 실행하고, 끝나는 순서대로 [`ScanEvent`]를 발행합니다.
//!
//! # 동작
//!
//! 1. `run()`이 드라이버 태스크 하나를 스폰하고 즉시 [`ScanStream`]을 반환
//! 2. 드라이버는 진행 중인 스캔이 `max_concurrency`보다 적을 때만 다음 경로를 받음
//!    (탐색 채널이 가득 차면 탐색도 멈춤)
//! 3. 스캔이 끝날 때마다 `Data`(Clean/Vulnerable) 또는 `Error`(Failed) 발행
//! 4. 탐색이 끝나고 진행 중인 스캔이 모두 끝나면 `End`를 한 번 발행
//!
//! 스캔 태스크가 패닉해도 해당 경로에 대해 `Failed` 결과가 발행되므로
//! 경로 하나당 결과 하나가 보장됩니다.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use bulkaudit_core::event::ScanEvent;
use bulkaudit_core::metrics as m;
use bulkaudit_core::types::ScanResult;

use crate::config::AuditRunnerConfig;
use crate::discovery::ProjectSource;
use crate::error::AuditRunnerError;
use crate::invoker::ScanInvoker;
use crate::report::ReportFormatter;
use crate::stream::ScanStream;

/// 이벤트 채널 기본 용량
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// 보고서 출력 대상
type ReportWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// 스캔 fan-out 코디네이터
///
/// `run()`을 여러 번 호출하면 각각 독립된 실행이 됩니다.
///
/// # 사용 예시
///
/// ```ignore
/// let coordinator = AuditCoordinatorBuilder::new()
///     .config(config)
///     .source(ManifestDiscoverer::default())
///     .invoker(ProcessInvoker::new("/opt/nsp"))
///     .build()?;
///
/// let mut stream = coordinator.run();
/// while let Some(event) = stream.next().await {
///     println!("{event}");
/// }
/// ```
pub struct AuditCoordinator<S: ProjectSource, I: ScanInvoker> {
    config: Arc<AuditRunnerConfig>,
    source: Arc<S>,
    invoker: Arc<I>,
    formatter: ReportFormatter,
    report_writer: ReportWriter,
    event_capacity: usize,
}

impl<S: ProjectSource, I: ScanInvoker> AuditCoordinator<S, I> {
    /// 러너 설정을 반환합니다.
    pub fn config(&self) -> &AuditRunnerConfig {
        &self.config
    }

    /// 스캔을 시작하고 이벤트 스트림을 반환합니다.
    ///
    /// tokio 런타임 안에서 호출되어야 합니다.
    pub fn run(&self) -> ScanStream {
        let run_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.event_capacity);
        let paths = self.source.discover(&self.config.root_path);

        let driver = Driver {
            config: Arc::clone(&self.config),
            invoker: Arc::clone(&self.invoker),
            formatter: self.formatter,
            report_writer: Arc::clone(&self.report_writer),
            tx,
        };

        let span = info_span!("audit_run", %run_id, root = %self.config.root_path.display());
        tokio::spawn(driver.drive(paths).instrument(span));

        ScanStream::new(run_id, rx)
    }
}

/// 한 번의 실행을 끝까지 진행하는 드라이버 태스크 상태
struct Driver<I: ScanInvoker> {
    config: Arc<AuditRunnerConfig>,
    invoker: Arc<I>,
    formatter: ReportFormatter,
    report_writer: ReportWriter,
    tx: mpsc::Sender<ScanEvent>,
}

/// 실행 요약
#[derive(Debug, Default)]
struct RunTally {
    clean: usize,
    vulnerable: usize,
    failed: usize,
}

impl<I: ScanInvoker> Driver<I> {
    async fn drive(self, mut paths: mpsc::Receiver<PathBuf>) {
        let limit = self.config.effective_concurrency();
        let mut pending: JoinSet<ScanResult> = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, PathBuf> = HashMap::new();
        let mut discovery_done = false;
        let mut tally = RunTally::default();
        let started = Instant::now();

        info!(concurrency = limit, "audit run started");

        loop {
            tokio::select! {
                Some(joined) = pending.join_next_with_id(), if !pending.is_empty() => {
                    let result = match joined {
                        Ok((id, result)) => {
                            in_flight.remove(&id);
                            result
                        }
                        Err(e) => {
                            let project_path = in_flight.remove(&e.id()).unwrap_or_default();
                            warn!(
                                project = %project_path.display(),
                                error = %e,
                                "scan task did not complete"
                            );
                            ScanResult::Failed {
                                project_path,
                                raw_error: format!("scan task did not complete: {e}"),
                            }
                        }
                    };
                    metrics::gauge!(m::RUNNER_SCANS_IN_FLIGHT).set(pending.len() as f64);
                    self.publish(result, &mut tally).await;
                }
                next = paths.recv(), if !discovery_done && pending.len() < limit => {
                    match next {
                        Some(project_path) => {
                            let id = self.spawn_scan(&mut pending, project_path.clone());
                            in_flight.insert(id, project_path);
                            metrics::gauge!(m::RUNNER_SCANS_IN_FLIGHT).set(pending.len() as f64);
                        }
                        None => {
                            debug!("discovery finished");
                            discovery_done = true;
                        }
                    }
                }
                else => break,
            }
        }

        info!(
            clean = tally.clean,
            vulnerable = tally.vulnerable,
            failed = tally.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audit run finished"
        );

        if self.tx.send(ScanEvent::End).await.is_err() {
            debug!("event stream dropped before end signal");
        }
    }

    fn spawn_scan(
        &self,
        pending: &mut JoinSet<ScanResult>,
        project_path: PathBuf,
    ) -> tokio::task::Id {
        debug!(project = %project_path.display(), "scan scheduled");
        let invoker = Arc::clone(&self.invoker);
        let handle = pending.spawn(
            async move {
                let started = Instant::now();
                let result = invoker.invoke(&project_path).await;
                metrics::histogram!(m::RUNNER_SCAN_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                result
            }
            .in_current_span(),
        );
        handle.id()
    }

    async fn publish(&self, result: ScanResult, tally: &mut RunTally) {
        debug!(
            project = %result.project_path().display(),
            outcome = result.outcome(),
            "scan settled"
        );

        match &result {
            ScanResult::Clean { .. } => tally.clean += 1,
            ScanResult::Vulnerable { findings, .. } => {
                tally.vulnerable += 1;
                metrics::counter!(m::RUNNER_FINDINGS_TOTAL).increment(findings.len() as u64);
            }
            ScanResult::Failed { .. } => tally.failed += 1,
        }
        metrics::counter!(m::RUNNER_SCANS_TOTAL, m::LABEL_RESULT => result.outcome()).increment(1);

        if self.config.show_log {
            self.write_report(&result);
        }

        if self.tx.send(ScanEvent::from_result(result)).await.is_err() {
            debug!("event stream dropped, result not delivered");
        }
    }

    fn write_report(&self, result: &ScanResult) {
        let text = self.formatter.format(result);
        let mut writer = match self.report_writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{text}\n").and_then(|()| writer.flush()) {
            warn!(error = %e, "failed to write report");
        }
    }
}

/// [`AuditCoordinator`] 빌더
pub struct AuditCoordinatorBuilder<S: ProjectSource, I: ScanInvoker> {
    config: AuditRunnerConfig,
    source: Option<S>,
    invoker: Option<I>,
    formatter: Option<ReportFormatter>,
    report_writer: Option<Box<dyn Write + Send>>,
    event_capacity: usize,
}

impl<S: ProjectSource, I: ScanInvoker> AuditCoordinatorBuilder<S, I> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: AuditRunnerConfig::default(),
            source: None,
            invoker: None,
            formatter: None,
            report_writer: None,
            event_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    /// 러너 설정을 지정합니다.
    pub fn config(mut self, config: AuditRunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// 프로젝트 공급자를 설정합니다.
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// 스캐너 실행기를 설정합니다.
    pub fn invoker(mut self, invoker: I) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// 보고서 출력 대상을 설정합니다. 기본값은 표준 출력입니다.
    pub fn report_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.report_writer = Some(Box::new(writer));
        self
    }

    /// 보고서 포매터를 설정합니다. 기본값은 [`ReportFormatter::detect`]입니다.
    pub fn formatter(mut self, formatter: ReportFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// 이벤트 채널 용량을 설정합니다.
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// 코디네이터를 빌드합니다.
    ///
    /// # Errors
    ///
    /// - 루트 경로가 비어 있으면 `AuditRunnerError::InvalidParameters`
    /// - 설정 검증 실패 또는 공급자/실행기 누락 시 `AuditRunnerError::Config`
    pub fn build(self) -> Result<AuditCoordinator<S, I>, AuditRunnerError> {
        self.config.validate()?;

        let source = self.source.ok_or_else(|| AuditRunnerError::Config {
            field: "source".to_owned(),
            reason: "project source must be provided".to_owned(),
        })?;
        let invoker = self.invoker.ok_or_else(|| AuditRunnerError::Config {
            field: "invoker".to_owned(),
            reason: "scan invoker must be provided".to_owned(),
        })?;

        let report_writer = self
            .report_writer
            .unwrap_or_else(|| Box::new(std::io::stdout()));

        Ok(AuditCoordinator {
            config: Arc::new(self.config),
            source: Arc::new(source),
            invoker: Arc::new(invoker),
            formatter: self.formatter.unwrap_or_else(ReportFormatter::detect),
            report_writer: Arc::new(Mutex::new(report_writer)),
            event_capacity: self.event_capacity,
        })
    }
}

impl<S: ProjectSource, I: ScanInvoker> Default for AuditCoordinatorBuilder<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditRunnerConfigBuilder;
    use std::path::Path;

    struct NoProjects;

    impl ProjectSource for NoProjects {
        fn discover(&self, _root: &Path) -> mpsc::Receiver<PathBuf> {
            let (_tx, rx) = mpsc::channel(1);
            rx
        }
    }

    struct AlwaysClean;

    impl ScanInvoker for AlwaysClean {
        async fn invoke(&self, project_path: &Path) -> ScanResult {
            ScanResult::Clean {
                project_path: project_path.to_path_buf(),
            }
        }
    }

    fn config() -> AuditRunnerConfig {
        AuditRunnerConfigBuilder::new()
            .root_path("/srv")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_missing_root() {
        let result = AuditCoordinatorBuilder::new()
            .source(NoProjects)
            .invoker(AlwaysClean)
            .build();
        assert!(matches!(result, Err(AuditRunnerError::InvalidParameters(_))));
    }

    #[test]
    fn builder_rejects_missing_source() {
        let result = AuditCoordinatorBuilder::<NoProjects, AlwaysClean>::new()
            .config(config())
            .invoker(AlwaysClean)
            .build();
        assert!(matches!(result, Err(AuditRunnerError::Config { .. })));
    }

    #[test]
    fn builder_rejects_missing_invoker() {
        let result = AuditCoordinatorBuilder::<NoProjects, AlwaysClean>::new()
            .config(config())
            .source(NoProjects)
            .build();
        assert!(matches!(result, Err(AuditRunnerError::Config { .. })));
    }

    #[tokio::test]
    async fn empty_discovery_only_ends() {
        let coordinator = AuditCoordinatorBuilder::new()
            .config(config())
            .source(NoProjects)
            .invoker(AlwaysClean)
            .report_writer(std::io::sink())
            .build()
            .unwrap();

        assert_eq!(coordinator.config().root_path, PathBuf::from("/srv"));
        let events = coordinator.run().collect().await;
        assert_eq!(events, vec![ScanEvent::End]);
    }
}
