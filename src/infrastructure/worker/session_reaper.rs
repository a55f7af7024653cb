//! Session Reaper - 回收空闲编辑会话

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::application::ports::EditorSessionManagerPort;
use crate::infrastructure::events::EventPublisher;

/// 会话回收配置
#[derive(Debug, Clone)]
pub struct SessionReaperConfig {
    /// 空闲超时（秒）
    pub idle_timeout_secs: u64,
    /// 检查间隔
    pub interval: Duration,
}

impl Default for SessionReaperConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            interval: Duration::from_secs(60),
        }
    }
}

/// 定期关闭空闲超时的会话
///
/// 已提交的快照由同步 Worker 继续保存，回收不会丢失登录用户的修改。
pub struct SessionReaper {
    config: SessionReaperConfig,
    session_manager: Arc<dyn EditorSessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SessionReaper {
    pub fn new(
        config: SessionReaperConfig,
        session_manager: Arc<dyn EditorSessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            session_manager,
            event_publisher,
        }
    }

    /// 执行一次回收，返回关闭的会话数
    pub fn reap_once(&self) -> usize {
        let expired = self
            .session_manager
            .get_expired_sessions(self.config.idle_timeout_secs);

        let mut closed = 0;
        for session_id in expired {
            // 检查和关闭之间会话可能已被客户端关闭
            if self.session_manager.close(&session_id).is_err() {
                continue;
            }
            self.event_publisher
                .publish_session_closed(&session_id, "idle_timeout");
            self.event_publisher.unregister_session(&session_id);
            closed += 1;
        }

        if closed > 0 {
            tracing::info!(
                closed,
                idle_timeout_secs = self.config.idle_timeout_secs,
                "Idle sessions reaped"
            );
        }
        closed
    }

    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            idle_timeout_secs = self.config.idle_timeout_secs,
            interval_secs = self.config.interval.as_secs(),
            "SessionReaper started"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.reap_once();
                }
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("SessionReaper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::{EditorSession, LoadedTree};
    use crate::domain::book::BookCatalog;
    use crate::domain::seed::default_chapters;
    use crate::infrastructure::events::WsEvent;
    use crate::infrastructure::memory::InMemoryEditorSessionManager;

    fn new_session() -> EditorSession {
        let book = BookCatalog::default().default_book().cloned().unwrap();
        let tree = default_chapters(book.id());
        EditorSession::new(book, LoadedTree::seeded(tree), None)
    }

    fn reaper(idle_timeout_secs: u64) -> (SessionReaper, Arc<InMemoryEditorSessionManager>, Arc<EventPublisher>) {
        let sessions = Arc::new(InMemoryEditorSessionManager::new());
        let publisher = Arc::new(EventPublisher::new());
        let reaper = SessionReaper::new(
            SessionReaperConfig {
                idle_timeout_secs,
                interval: Duration::from_millis(10),
            },
            sessions.clone(),
            publisher.clone(),
        );
        (reaper, sessions, publisher)
    }

    #[test]
    fn test_active_sessions_survive() {
        let (reaper, sessions, _) = reaper(3600);
        let session_id = sessions.create(new_session()).unwrap();

        assert_eq!(reaper.reap_once(), 0);
        assert!(sessions.is_valid(&session_id));
    }

    #[tokio::test]
    async fn test_idle_session_is_closed_and_announced() {
        let (reaper, sessions, publisher) = reaper(0);
        let session_id = sessions.create(new_session()).unwrap();
        let mut events = publisher.register_session(&session_id);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(reaper.reap_once(), 1);
        assert!(!sessions.is_valid(&session_id));

        assert_eq!(
            events.recv().await.unwrap(),
            WsEvent::SessionClosed {
                session_id: session_id.clone(),
                reason: "idle_timeout".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (reaper, _, _) = reaper(3600);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(reaper.run(async {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
