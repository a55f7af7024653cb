//! Editor Queries

use crate::domain::chapter::ChapterId;

/// 获取会话视图
#[derive(Debug, Clone)]
pub struct GetSession {
    pub session_id: String,
}

/// 查找章节
#[derive(Debug, Clone)]
pub struct FindChapter {
    pub session_id: String,
    pub chapter_id: ChapterId,
}

/// 章节树扁平化（深度优先，带层级）
#[derive(Debug, Clone)]
pub struct FlattenChapters {
    pub session_id: String,
}

/// 导出 Markdown
#[derive(Debug, Clone)]
pub struct ExportMarkdown {
    pub session_id: String,
}

/// 列出书籍目录
#[derive(Debug, Clone)]
pub struct ListBooks;
