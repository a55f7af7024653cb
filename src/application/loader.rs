//! Book Loader - 书籍章节树加载
//!
//! 已登录用户从快照存储加载；不存在或加载失败时回退到默认内容。
//! 加载前先让同步端保存该键的待保存快照，revision 不低于已提交过的最高值。

use std::sync::Arc;

use crate::application::ports::{SnapshotKey, SnapshotStorePort, SnapshotSyncPort};
use crate::application::session::LoadedTree;
use crate::domain::book::BookUniverse;
use crate::domain::seed::default_chapters;

pub struct BookLoader {
    store: Arc<dyn SnapshotStorePort>,
    sync: Arc<dyn SnapshotSyncPort>,
}

impl BookLoader {
    pub fn new(store: Arc<dyn SnapshotStorePort>, sync: Arc<dyn SnapshotSyncPort>) -> Self {
        Self { store, sync }
    }

    /// 加载 (用户, 书籍) 的章节树
    ///
    /// 未登录时直接使用默认内容；加载失败不会中断切换，只记录警告。
    pub async fn load(&self, user_id: Option<&str>, book: &BookUniverse) -> LoadedTree {
        let Some(user_id) = user_id else {
            return LoadedTree::seeded(default_chapters(book.id()));
        };

        let key = SnapshotKey::new(user_id, book.id().as_str());
        self.load_stored(&key)
            .await
            .unwrap_or_else(|| LoadedTree::seeded(default_chapters(book.id())))
            .with_revision_floor(self.revision_floor(&key))
    }

    /// 保存该键的待保存快照后读取存储；不存在或失败时返回 None
    pub async fn load_stored(&self, key: &SnapshotKey) -> Option<LoadedTree> {
        self.sync.flush(key).await;
        self.fetch(key).await
    }

    /// 该键已提交过的最高 revision
    pub fn revision_floor(&self, key: &SnapshotKey) -> u64 {
        self.sync.latest_submitted(key).unwrap_or(0)
    }

    async fn fetch(&self, key: &SnapshotKey) -> Option<LoadedTree> {
        match self.store.load_snapshot(key).await {
            Ok(Some(snapshot)) => {
                let loaded = LoadedTree::from_snapshot(snapshot);
                if !loaded.tree.has_unique_ids() {
                    tracing::warn!(
                        key = %key,
                        backend = self.store.backend_name(),
                        "Snapshot contains duplicate chapter ids; edits target the first match"
                    );
                }
                tracing::debug!(
                    key = %key,
                    revision = loaded.revision,
                    nodes = loaded.tree.node_count(),
                    "Snapshot loaded"
                );
                Some(loaded)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "No snapshot stored, using default chapters");
                None
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Failed to load snapshot, using default chapters"
                );
                None
            }
        }
    }
}
