//! Memory Layer - In-Memory State Management
//!
//! 编辑会话与快照存储的内存实现

mod session_manager;
mod snapshot_store;

pub use session_manager::InMemoryEditorSessionManager;
pub use snapshot_store::InMemorySnapshotStore;
