//! Save Debouncer - 快照保存合并
//!
//! 同一快照键在静默期内的多次提交合并为一次保存。
//! 每次提交都会取消旧的计时并重新计时（cancel + reschedule），
//! 待保存项只保留最高的 revision。

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::{SnapshotEnvelope, SnapshotKey};

/// 待保存项
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub envelope: SnapshotEnvelope,
    pub deadline: Instant,
    /// 已失败的次数
    pub attempt: u32,
}

/// 保存合并器
#[derive(Debug)]
pub struct SaveDebouncer {
    quiet_period: Duration,
    pending: HashMap<SnapshotKey, PendingSave>,
}

impl SaveDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: HashMap::new(),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// 提交快照并重新计时
    ///
    /// 已有更高 revision 待保存时忽略本次提交，返回 false。
    pub fn schedule(&mut self, envelope: SnapshotEnvelope, now: Instant) -> bool {
        if let Some(existing) = self.pending.get(&envelope.key) {
            if existing.envelope.revision > envelope.revision {
                return false;
            }
        }
        let deadline = now + self.quiet_period;
        self.pending.insert(
            envelope.key.clone(),
            PendingSave {
                envelope,
                deadline,
                attempt: 0,
            },
        );
        true
    }

    /// 失败后重新排队
    ///
    /// 期间已有相同或更新的 revision 待保存时放弃重试，返回 false。
    pub fn retry(&mut self, envelope: SnapshotEnvelope, attempt: u32, now: Instant) -> bool {
        if let Some(existing) = self.pending.get(&envelope.key) {
            if existing.envelope.revision >= envelope.revision {
                return false;
            }
        }
        let deadline = now + self.quiet_period;
        self.pending.insert(
            envelope.key.clone(),
            PendingSave {
                envelope,
                deadline,
                attempt,
            },
        );
        true
    }

    /// 取出某个键的待保存项（不再等待静默期）
    pub fn cancel(&mut self, key: &SnapshotKey) -> Option<PendingSave> {
        self.pending.remove(key)
    }

    /// 最早的截止时间
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// 取出所有已到期的项，按截止时间排序
    pub fn take_due(&mut self, now: Instant) -> Vec<PendingSave> {
        let due_keys: Vec<SnapshotKey> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();

        let mut due: Vec<PendingSave> = due_keys
            .iter()
            .filter_map(|k| self.pending.remove(k))
            .collect();
        due.sort_by_key(|p| p.deadline);
        due
    }

    /// 取出全部待保存项（关闭时刷新）
    pub fn drain(&mut self) -> Vec<PendingSave> {
        let mut all: Vec<PendingSave> = self.pending.drain().map(|(_, p)| p).collect();
        all.sort_by_key(|p| p.deadline);
        all
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
