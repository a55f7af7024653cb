//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 章节树变更
    TreeChanged {
        session_id: String,
        revision: u64,
        edit: String,
    },
    /// 切换书籍
    BookSwitched {
        session_id: String,
        book_id: String,
        source: String,
    },
    /// 会话关闭
    SessionClosed {
        session_id: String,
        reason: String,
    },
    /// 快照已持久化
    SnapshotSaved {
        user_id: String,
        book_id: String,
        revision: u64,
    },
    /// 快照持久化失败
    SnapshotFailed {
        user_id: String,
        book_id: String,
        revision: u64,
        error: String,
    },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    /// 同步事件全局广播
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            session_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件（同步结果）
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.session_channels.get(session_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.session_channels.insert(session_id.to_string(), tx);
        rx
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<WsEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    pub fn publish_tree_changed(&self, session_id: &str, revision: u64, edit: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::TreeChanged {
                session_id: session_id.to_string(),
                revision,
                edit: edit.to_string(),
            },
        );
    }

    pub fn publish_book_switched(&self, session_id: &str, book_id: &str, source: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::BookSwitched {
                session_id: session_id.to_string(),
                book_id: book_id.to_string(),
                source: source.to_string(),
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布快照保存成功事件（全局广播）
    pub fn publish_snapshot_saved(&self, user_id: &str, book_id: &str, revision: u64) {
        self.publish_global(WsEvent::SnapshotSaved {
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            revision,
        });
    }

    /// 发布快照保存失败事件（全局广播）
    pub fn publish_snapshot_failed(&self, user_id: &str, book_id: &str, revision: u64, error: &str) {
        self.publish_global(WsEvent::SnapshotFailed {
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            revision,
            error: error.to_string(),
        });
    }

    fn publish_global(&self, event: WsEvent) {
        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish global event (no receivers)");
        }
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &str, event: WsEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
