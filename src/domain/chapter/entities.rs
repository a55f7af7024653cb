//! Chapter Context - Entities

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// 章节唯一标识
///
/// 新建章节使用 UUID v4；从快照加载的 ID 原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ChapterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChapterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节节点（章或小节）
///
/// 子节点以 `Arc` 共享：树的每次修改只复制根到目标节点的路径，
/// 其余子树在新旧两棵树之间共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    content: String,
    is_open: bool,
    children: Vec<Arc<Chapter>>,
}

impl Chapter {
    /// 新建章节：空内容、展开状态、无子节点
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(ChapterId::new(), title)
    }

    pub fn with_id(id: ChapterId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            is_open: true,
            children: Vec::new(),
        }
    }

    /// 从完整字段构建（快照加载、种子数据）
    pub fn from_parts(
        id: ChapterId,
        title: impl Into<String>,
        content: impl Into<String>,
        is_open: bool,
        children: Vec<Chapter>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            is_open,
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    pub fn with_children(mut self, children: Vec<Chapter>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    // Getters
    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn children(&self) -> &[Arc<Chapter>] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn last_child(&self) -> Option<&Chapter> {
        self.children.last().map(|c| c.as_ref())
    }

    // Crate-internal mutators, only used on freshly copied path nodes
    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub(crate) fn set_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    pub(crate) fn replace_children(&mut self, children: Vec<Arc<Chapter>>) {
        self.children = children;
    }
}
