//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod repositories;
mod session_manager;
mod snapshot_sync;

pub use repositories::{
    records_to_tree, tree_to_records, ChapterRecord, RepositoryError, SnapshotKey, MAX_REVISION,
    SnapshotStorePort, StoredSnapshot,
};
pub use session_manager::{EditorSessionManagerPort, SessionError};
pub use snapshot_sync::{
    SnapshotEnvelope, SnapshotSyncPort, SyncError, SyncOutcome, SyncReport, SyncStatus,
};
