//! Snapshot Sync Worker - Background Snapshot Persistence
//!
//! 从队列消费快照信封，静默期后按顺序写入存储。
//! 同一时刻只有一个保存在进行，同一快照键的写入按 revision 顺序落盘。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};

use super::debounce::{PendingSave, SaveDebouncer};
use crate::application::ports::{
    tree_to_records, SnapshotEnvelope, SnapshotKey, SnapshotStorePort, SnapshotSyncPort,
    StoredSnapshot, SyncError, SyncOutcome, SyncReport,
};
use crate::infrastructure::events::EventPublisher;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct SnapshotSyncConfig {
    /// 静默期
    pub debounce: Duration,
    /// 失败后的最大重试次数
    pub max_retries: u32,
    /// 队列容量
    pub queue_capacity: usize,
}

impl Default for SnapshotSyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            max_retries: 3,
            queue_capacity: 256,
        }
    }
}

type ReportBoard = Arc<DashMap<SnapshotKey, SyncReport>>;

/// 记录报告；不会用旧 revision 的报告覆盖新 revision 的报告
fn record_report(reports: &ReportBoard, key: &SnapshotKey, report: SyncReport) {
    let newer_exists = reports
        .get(key)
        .map(|existing| existing.revision > report.revision)
        .unwrap_or(false);
    if !newer_exists {
        reports.insert(key.clone(), report);
    }
}

/// 队列消息
#[derive(Debug)]
enum SyncCommand {
    /// 合并后保存
    Save(SnapshotEnvelope),
    /// 跳过静默期立即保存该键，完成后应答
    Flush(SnapshotKey, oneshot::Sender<()>),
}

/// 同步队列（提交端）
#[derive(Clone)]
pub struct SyncQueue {
    sender: mpsc::Sender<SyncCommand>,
    reports: ReportBoard,
    /// 每个键已提交的最高 revision
    submitted: Arc<DashMap<SnapshotKey, u64>>,
}

#[async_trait]
impl SnapshotSyncPort for SyncQueue {
    fn submit(&self, envelope: SnapshotEnvelope) -> Result<(), SyncError> {
        let key = envelope.key.clone();
        let revision = envelope.revision;
        self.sender
            .try_send(SyncCommand::Save(envelope))
            .map_err(|e| match e {
                TrySendError::Full(_) => SyncError::QueueFull,
                TrySendError::Closed(_) => SyncError::Closed,
            })?;

        let mut latest = self.submitted.entry(key).or_insert(revision);
        if *latest < revision {
            *latest = revision;
        }
        Ok(())
    }

    async fn flush(&self, key: &SnapshotKey) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .sender
            .send(SyncCommand::Flush(key.clone(), ack_tx))
            .await
            .is_err()
        {
            tracing::debug!(key = %key, "Sync worker stopped, flush skipped");
            return;
        }
        // Worker 退出时 ack 被丢弃，同样视为完成
        let _ = ack_rx.await;
    }

    fn latest_submitted(&self, key: &SnapshotKey) -> Option<u64> {
        self.submitted.get(key).map(|r| *r)
    }

    fn report(&self, key: &SnapshotKey) -> Option<SyncReport> {
        self.reports.get(key).map(|r| r.clone())
    }
}

/// 快照同步 Worker
pub struct SnapshotSyncWorker {
    config: SnapshotSyncConfig,
    receiver: mpsc::Receiver<SyncCommand>,
    store: Arc<dyn SnapshotStorePort>,
    reports: ReportBoard,
    event_publisher: Arc<EventPublisher>,
    debouncer: SaveDebouncer,
}

/// 创建同步队列和对应的 Worker
pub fn snapshot_sync_channel(
    config: SnapshotSyncConfig,
    store: Arc<dyn SnapshotStorePort>,
    event_publisher: Arc<EventPublisher>,
) -> (SyncQueue, SnapshotSyncWorker) {
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    let reports: ReportBoard = Arc::new(DashMap::new());

    let queue = SyncQueue {
        sender,
        reports: reports.clone(),
        submitted: Arc::new(DashMap::new()),
    };
    let worker = SnapshotSyncWorker {
        debouncer: SaveDebouncer::new(config.debounce),
        config,
        receiver,
        store,
        reports,
        event_publisher,
    };
    (queue, worker)
}

impl SnapshotSyncWorker {
    /// 启动 Worker，`shutdown` 完成或队列关闭后刷新剩余快照并退出
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            backend = self.store.backend_name(),
            debounce_ms = self.debouncer.quiet_period().as_millis() as u64,
            max_retries = self.config.max_retries,
            "SnapshotSyncWorker started"
        );

        tokio::pin!(shutdown);

        loop {
            let deadline = self.debouncer.next_deadline();
            tokio::select! {
                received = self.receiver.recv() => match received {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    for due in self.debouncer.take_due(Instant::now()) {
                        self.persist(due, true).await;
                    }
                }
                _ = &mut shutdown => {
                    // 收下已提交但尚未处理的信封
                    self.receiver.close();
                    while let Some(command) = self.receiver.recv().await {
                        self.handle(command).await;
                    }
                    break;
                }
            }
        }

        self.flush_all().await;
        tracing::info!("SnapshotSyncWorker stopped");
    }

    async fn handle(&mut self, command: SyncCommand) {
        match command {
            SyncCommand::Save(envelope) => self.enqueue(envelope),
            SyncCommand::Flush(key, ack) => {
                if let Some(pending) = self.debouncer.cancel(&key) {
                    tracing::debug!(
                        key = %key,
                        revision = pending.envelope.revision,
                        "Flushing snapshot before reload"
                    );
                    self.persist(pending, true).await;
                }
                let _ = ack.send(());
            }
        }
    }

    fn enqueue(&mut self, envelope: SnapshotEnvelope) {
        let key = envelope.key.clone();
        let revision = envelope.revision;
        if self.debouncer.schedule(envelope, Instant::now()) {
            tracing::trace!(key = %key, revision = revision, "Snapshot scheduled");
        } else {
            tracing::debug!(key = %key, revision = revision, "Older snapshot ignored");
        }
    }

    /// 关闭前保存所有待保存项（不再重试）
    async fn flush_all(&mut self) {
        if self.debouncer.is_empty() {
            return;
        }
        tracing::info!(count = self.debouncer.len(), "Flushing pending snapshots");
        let pending = self.debouncer.drain();
        for due in pending {
            self.persist(due, false).await;
        }
    }

    async fn persist(&mut self, due: PendingSave, allow_retry: bool) {
        let PendingSave {
            envelope, attempt, ..
        } = due;
        let key = envelope.key.clone();
        let revision = envelope.revision;
        let snapshot = StoredSnapshot {
            revision,
            chapters: tree_to_records(&envelope.tree),
        };

        match self.store.save_snapshot(&key, &snapshot).await {
            Ok(()) => {
                record_report(
                    &self.reports,
                    &key,
                    SyncReport {
                        revision,
                        outcome: SyncOutcome::Saved,
                        at: Utc::now(),
                    },
                );
                self.event_publisher
                    .publish_snapshot_saved(&key.user_id, &key.book_id, revision);
                tracing::debug!(
                    key = %key,
                    revision = revision,
                    backend = self.store.backend_name(),
                    "Snapshot saved"
                );
            }
            Err(e) => {
                let error = e.to_string();
                record_report(
                    &self.reports,
                    &key,
                    SyncReport {
                        revision,
                        outcome: SyncOutcome::Failed(error.clone()),
                        at: Utc::now(),
                    },
                );
                self.event_publisher
                    .publish_snapshot_failed(&key.user_id, &key.book_id, revision, &error);

                let retry = allow_retry && !e.is_permanent() && attempt < self.config.max_retries;
                tracing::warn!(
                    key = %key,
                    revision = revision,
                    attempt = attempt + 1,
                    retry = retry,
                    error = %error,
                    "Snapshot save failed"
                );

                if retry && !self.debouncer.retry(envelope, attempt + 1, Instant::now()) {
                    tracing::debug!(key = %key, revision = revision, "Retry superseded by newer snapshot");
                }
            }
        }
    }
}
