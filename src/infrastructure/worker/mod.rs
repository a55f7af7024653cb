//! Worker Layer - Background Task Processing
//!
//! 快照保存合并与后台持久化，空闲会话回收

mod debounce;
mod session_reaper;
mod snapshot_sync_worker;

pub use debounce::{PendingSave, SaveDebouncer};
pub use session_reaper::{SessionReaper, SessionReaperConfig};
pub use snapshot_sync_worker::{
    snapshot_sync_channel, SnapshotSyncConfig, SnapshotSyncWorker, SyncQueue,
};
