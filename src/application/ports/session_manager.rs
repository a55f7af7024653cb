//! Session Manager Port - 编辑会话生命周期管理
//!
//! 定义会话管理的抽象接口，具体实现在 infrastructure/memory 层

use thiserror::Error;

use crate::application::session::EditorSession;

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),
}

/// Session Manager Port
///
/// 管理编辑会话的生命周期，所有状态存储在内存中。
/// 同一会话上的修改通过 `modify` 串行执行。
pub trait EditorSessionManagerPort: Send + Sync {
    /// 创建新会话
    fn create(&self, session: EditorSession) -> Result<String, SessionError>;

    /// 获取会话副本（章节树共享存储，复制开销很小）
    fn get(&self, id: &str) -> Result<EditorSession, SessionError>;

    /// 在会话锁内执行修改
    fn modify(
        &self,
        id: &str,
        f: &mut dyn FnMut(&mut EditorSession),
    ) -> Result<(), SessionError>;

    /// 检查会话是否有效
    fn is_valid(&self, id: &str) -> bool;

    /// 关闭会话
    fn close(&self, id: &str) -> Result<(), SessionError>;

    /// 获取所有过期会话的 ID
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
