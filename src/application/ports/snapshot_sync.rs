//! Snapshot Sync Port - 快照同步边界
//!
//! 会话在每次真实修改后提交快照信封；同步端负责合并短时间内的连续修改
//! （debounce），静默期结束后再写入存储。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::SnapshotKey;
use crate::domain::chapter::ChapterTree;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync queue is closed")]
    Closed,

    #[error("Sync queue is full")]
    QueueFull,
}

/// 待持久化的快照
#[derive(Debug, Clone)]
pub struct SnapshotEnvelope {
    pub key: SnapshotKey,
    pub revision: u64,
    pub tree: ChapterTree,
}

/// 一次持久化的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Saved,
    Failed(String),
}

/// 某个快照键最近一次持久化的报告
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub revision: u64,
    pub outcome: SyncOutcome,
    pub at: DateTime<Utc>,
}

/// 会话视角的同步状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// 未登录，只在本地编辑
    LocalOnly,
    /// 最新修改已持久化
    Synced,
    /// 有修改尚未持久化
    Pending,
    /// 最近一次持久化失败
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::LocalOnly => "local_only",
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::Failed => "failed",
        }
    }
}

/// Snapshot Sync Port
#[async_trait]
pub trait SnapshotSyncPort: Send + Sync {
    /// 提交快照（非阻塞）
    fn submit(&self, envelope: SnapshotEnvelope) -> Result<(), SyncError>;

    /// 立即保存该键的待保存快照并等待完成
    ///
    /// 重新加载某个键之前调用，保证读到的是最新提交的内容。
    async fn flush(&self, key: &SnapshotKey);

    /// 该键提交过的最高 revision
    fn latest_submitted(&self, key: &SnapshotKey) -> Option<u64>;

    /// 最近一次持久化报告
    fn report(&self, key: &SnapshotKey) -> Option<SyncReport>;
}
