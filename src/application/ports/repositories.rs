//! Repository Ports - 出站端口
//!
//! 定义章节树快照持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite、远程 HTTP、内存）

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::chapter::{Chapter, ChapterId, ChapterTree};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// 存储中已有更新的版本
    #[error("Stale snapshot for {key}: revision {revision} is not newer than stored revision {stored}")]
    Stale {
        key: String,
        revision: u64,
        stored: u64,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl RepositoryError {
    /// 重试无意义的错误
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RepositoryError::Stale { .. } | RepositoryError::SerializationError(_)
        )
    }
}

// ============================================================================
// Snapshot Records
// ============================================================================

/// 可持久化的最大 revision（SQLite 以 INTEGER 即 i64 保存）
pub const MAX_REVISION: u64 = i64::MAX as u64;

/// 快照键：(用户, 书籍)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub user_id: String,
    pub book_id: String,
}

impl SnapshotKey {
    pub fn new(user_id: impl Into<String>, book_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            book_id: book_id.into(),
        }
    }
}

impl std::fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.book_id)
    }
}

/// 章节记录（快照中的持久化格式）
///
/// `children` 缺省、为 null 或为空数组等价；序列化时空数组省略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_open: bool,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<ChapterRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChapterRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<ChapterRecord>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl From<&Chapter> for ChapterRecord {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id().to_string(),
            title: chapter.title().to_string(),
            content: chapter.content().to_string(),
            is_open: chapter.is_open(),
            children: chapter
                .children()
                .iter()
                .map(|c| ChapterRecord::from(c.as_ref()))
                .collect(),
        }
    }
}

impl From<ChapterRecord> for Chapter {
    fn from(record: ChapterRecord) -> Self {
        Chapter::from_parts(
            ChapterId::from(record.id),
            record.title,
            record.content,
            record.is_open,
            record.children.into_iter().map(Chapter::from).collect(),
        )
    }
}

/// 章节树 → 快照记录
pub fn tree_to_records(tree: &ChapterTree) -> Vec<ChapterRecord> {
    tree.roots()
        .iter()
        .map(|c| ChapterRecord::from(c.as_ref()))
        .collect()
}

/// 快照记录 → 章节树
pub fn records_to_tree(records: Vec<ChapterRecord>) -> ChapterTree {
    ChapterTree::from_chapters(records.into_iter().map(Chapter::from).collect())
}

/// 已持久化的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// 逻辑修改序号，用于"后写者胜"判定
    pub revision: u64,
    pub chapters: Vec<ChapterRecord>,
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Snapshot Store Port
///
/// 按 (用户, 书籍) 存取整棵章节树。
/// 保存时 revision 必须大于已存储的 revision，否则返回 `RepositoryError::Stale`。
#[async_trait]
pub trait SnapshotStorePort: Send + Sync {
    /// 加载快照，不存在时返回 None
    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<StoredSnapshot>, RepositoryError>;

    /// 保存快照
    async fn save_snapshot(
        &self,
        key: &SnapshotKey,
        snapshot: &StoredSnapshot,
    ) -> Result<(), RepositoryError>;

    /// 后端名称（用于日志）
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let tree = ChapterTree::from_chapters(vec![Chapter::with_id(ChapterId::from("c1"), "第一章")
            .with_content("正文")
            .with_children(vec![Chapter::with_id(ChapterId::from("s1"), "1.1").with_open(false)])]);

        let json = serde_json::to_value(tree_to_records(&tree)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": "c1",
                "title": "第一章",
                "content": "正文",
                "isOpen": true,
                "children": [{"id": "s1", "title": "1.1", "content": "", "isOpen": false}]
            }])
        );
    }

    #[test]
    fn test_absent_null_and_empty_children_are_equivalent() {
        let json = r#"[
            {"id": "a", "title": "A", "content": "", "isOpen": true},
            {"id": "b", "title": "B", "content": "", "isOpen": true, "children": null},
            {"id": "c", "title": "C", "content": "", "isOpen": true, "children": []}
        ]"#;
        let records: Vec<ChapterRecord> = serde_json::from_str(json).unwrap();
        assert!(records.iter().all(|r| r.children.is_empty()));

        let tree = records_to_tree(records);
        assert!(tree.roots().iter().all(|c| !c.has_children()));
    }

    #[test]
    fn test_records_round_trip_preserves_tree() {
        let tree = ChapterTree::from_chapters(vec![
            Chapter::new("序章").with_content("开篇"),
            Chapter::new("第一章").with_children(vec![Chapter::new("1.1 起点")]),
        ]);
        assert_eq!(records_to_tree(tree_to_records(&tree)), tree);
    }

    #[test]
    fn test_snapshot_key_display() {
        assert_eq!(SnapshotKey::new("u1", "star-sea").to_string(), "u1/star-sea");
    }

    #[test]
    fn test_permanent_errors() {
        let stale = RepositoryError::Stale {
            key: "u/b".to_string(),
            revision: 1,
            stored: 2,
        };
        assert!(stale.is_permanent());
        assert!(!RepositoryError::NetworkError("timeout".to_string()).is_permanent());
    }
}
