//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod http;
pub mod memory;
pub mod persistence;
pub mod worker;

pub use adapters::{HttpSnapshotStore, HttpSnapshotStoreConfig};
pub use events::{EventPublisher, WsEvent};
pub use memory::{InMemoryEditorSessionManager, InMemorySnapshotStore};
pub use persistence::sqlite::{create_pool, run_migrations, DatabaseConfig, SqliteSnapshotRepository};
pub use worker::{
    snapshot_sync_channel, SessionReaper, SessionReaperConfig, SnapshotSyncConfig, SnapshotSyncWorker,
    SyncQueue,
};
