//! 이벤트 스트림 -- 코디네이터가 발행하는 [`ScanEvent`]의 수신측

use tokio::sync::mpsc;
use uuid::Uuid;

use bulkaudit_core::event::ScanEvent;

use crate::error::AuditRunnerError;

/// 한 번의 실행에서 발행되는 이벤트 스트림
///
/// 이벤트는 스캔이 끝나는 순서대로 도착하며, 마지막 이벤트는 항상 `End`입니다.
/// `End` 이후 [`next`](Self::next)는 `None`을 반환합니다.
///
/// 스트림을 drop해도 실행 중인 스캔은 취소되지 않습니다.
#[derive(Debug)]
pub struct ScanStream {
    run_id: Uuid,
    rx: mpsc::Receiver<ScanEvent>,
    finished: bool,
    saw_end: bool,
}

impl ScanStream {
    pub(crate) fn new(run_id: Uuid, rx: mpsc::Receiver<ScanEvent>) -> Self {
        Self {
            run_id,
            rx,
            finished: false,
            saw_end: false,
        }
    }

    /// 실행 식별자
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 다음 이벤트를 기다립니다.
    pub async fn next(&mut self) -> Option<ScanEvent> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().await;
        if matches!(event, None | Some(ScanEvent::End)) {
            self.finished = true;
            self.saw_end = event.is_some();
            self.rx.close();
        }
        event
    }

    /// `End`를 받았는지 확인합니다.
    ///
    /// 스트림이 `End` 없이 닫혔다면(코디네이터 태스크 중단 등) 일부 결과가
    /// 빠졌을 수 있으므로 `Channel` 에러를 반환합니다.
    pub fn ensure_complete(&self) -> Result<(), AuditRunnerError> {
        if self.saw_end {
            Ok(())
        } else {
            Err(AuditRunnerError::Channel(format!(
                "run {} closed before all projects were reported",
                self.run_id
            )))
        }
    }

    /// `End`까지 모든 이벤트를 모읍니다. `End`도 포함됩니다.
    pub async fn collect(mut self) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkaudit_core::types::ScanResult;
    use std::path::PathBuf;

    #[tokio::test]
    async fn stops_after_end() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = ScanStream::new(Uuid::new_v4(), rx);

        tx.send(ScanEvent::Data(ScanResult::Clean {
            project_path: PathBuf::from("/a"),
        }))
        .await
        .unwrap();
        tx.send(ScanEvent::End).await.unwrap();

        assert!(matches!(stream.next().await, Some(ScanEvent::Data(_))));
        assert!(matches!(stream.next().await, Some(ScanEvent::End)));
        assert!(stream.next().await.is_none());
        // End 이후 보낸 이벤트는 수신되지 않음
        assert!(tx.send(ScanEvent::End).await.is_err());
    }

    #[tokio::test]
    async fn collect_includes_end() {
        let (tx, rx) = mpsc::channel(4);
        let run_id = Uuid::new_v4();
        let stream = ScanStream::new(run_id, rx);
        assert_eq!(stream.run_id(), run_id);

        tx.send(ScanEvent::End).await.unwrap();
        drop(tx);

        assert_eq!(stream.collect().await, vec![ScanEvent::End]);
    }

    #[tokio::test]
    async fn closed_channel_ends_stream() {
        let (tx, rx) = mpsc::channel::<ScanEvent>(1);
        drop(tx);
        let mut stream = ScanStream::new(Uuid::new_v4(), rx);
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn closed_channel_without_end_is_incomplete() {
        let (tx, rx) = mpsc::channel::<ScanEvent>(2);
        let mut stream = ScanStream::new(Uuid::new_v4(), rx);
        tx.send(ScanEvent::Data(ScanResult::Clean {
            project_path: PathBuf::from("/a"),
        }))
        .await
        .unwrap();
        drop(tx);

        assert!(stream.ensure_complete().is_err());
        while stream.next().await.is_some() {}

        let err = stream.ensure_complete().expect_err("End was never sent");
        assert!(matches!(err, AuditRunnerError::Channel(_)));
        assert!(err.to_string().contains(&stream.run_id().to_string()));
    }

    #[tokio::test]
    async fn end_marks_stream_complete() {
        let (tx, rx) = mpsc::channel(1);
        let mut stream = ScanStream::new(Uuid::new_v4(), rx);
        tx.send(ScanEvent::End).await.unwrap();

        assert!(matches!(stream.next().await, Some(ScanEvent::End)));
        assert!(stream.ensure_complete().is_ok());
    }
}
