//! Remote Adapters - 远程快照存储

mod http_snapshot_store;

pub use http_snapshot_store::{HttpSnapshotStore, HttpSnapshotStoreConfig};
