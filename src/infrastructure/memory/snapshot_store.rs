//! In-Memory Snapshot Store
//!
//! 不落盘的快照存储，进程退出后数据丢失。用于测试和 `backend = "memory"`。

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::application::ports::{RepositoryError, SnapshotKey, SnapshotStorePort, StoredSnapshot};

pub struct InMemorySnapshotStore {
    snapshots: DashMap<SnapshotKey, StoredSnapshot>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStorePort for InMemorySnapshotStore {
    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<StoredSnapshot>, RepositoryError> {
        Ok(self.snapshots.get(key).map(|s| s.clone()))
    }

    async fn save_snapshot(&self, key: &SnapshotKey, snapshot: &StoredSnapshot) -> Result<(), RepositoryError> {
        match self.snapshots.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get().revision;
                if snapshot.revision <= stored {
                    return Err(RepositoryError::Stale {
                        key: key.to_string(),
                        revision: snapshot.revision,
                        stored,
                    });
                }
                entry.insert(snapshot.clone());
            }
            Entry::Vacant(entry) => {
                entry.insert(snapshot.clone());
            }
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
