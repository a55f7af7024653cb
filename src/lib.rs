//! Chapterhouse - 多书籍章节树编辑服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书籍（世界观）目录
//! - Chapter Context: 不可变章节树，插入时自动编号
//! - 中文数字编解码、标题递增、Markdown 导出、选中项
//!
//! 应用层 (application/):
//! - Ports: SnapshotStore, SnapshotSync, EditorSessionManager
//! - Session: 编辑会话（当前书籍、章节树、选中项、修改序号）
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 会话管理与快照存储的内存实现
//! - Worker: 快照保存合并（debounce）与空闲会话回收
//! - Persistence: SQLite 快照存储
//! - Adapters: 远程快照存储客户端
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
