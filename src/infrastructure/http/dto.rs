//! Data Transfer Objects

use serde::Serialize;

use crate::application::{SessionView, SyncStatus};
use crate::domain::book::BookUniverse;
use crate::domain::chapter::{Chapter, FlatEntry};
use crate::domain::Selection;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Book DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookDto {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub accent: String,
}

impl From<&BookUniverse> for BookDto {
    fn from(book: &BookUniverse) -> Self {
        Self {
            id: book.id().as_str().to_string(),
            title: book.title().to_string(),
            icon: book.icon().to_string(),
            accent: book.accent().as_str().to_string(),
        }
    }
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChapterDto {
    pub id: String,
    pub title: String,
    pub content: String,
    pub is_open: bool,
    pub children: Vec<ChapterDto>,
}

impl From<&Chapter> for ChapterDto {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id().to_string(),
            title: chapter.title().to_string(),
            content: chapter.content().to_string(),
            is_open: chapter.is_open(),
            children: chapter
                .children()
                .iter()
                .map(|c| ChapterDto::from(c.as_ref()))
                .collect(),
        }
    }
}

/// 扁平化后的章节（不含正文）
#[derive(Debug, Serialize)]
pub struct FlatEntryDto {
    pub id: String,
    pub title: String,
    pub level: usize,
    pub is_open: bool,
    pub has_children: bool,
}

impl From<&FlatEntry> for FlatEntryDto {
    fn from(entry: &FlatEntry) -> Self {
        Self {
            id: entry.chapter.id().to_string(),
            title: entry.chapter.title().to_string(),
            level: entry.level,
            is_open: entry.chapter.is_open(),
            has_children: entry.chapter.has_children(),
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionViewDto {
    pub session_id: String,
    pub user_id: Option<String>,
    pub book: BookDto,
    pub selection: Selection,
    pub revision: u64,
    pub sync_status: SyncStatus,
    pub source: &'static str,
    pub chapters: Vec<ChapterDto>,
    pub created_at: String,
    pub last_activity: String,
}

impl From<SessionView> for SessionViewDto {
    fn from(view: SessionView) -> Self {
        Self {
            book: BookDto::from(&view.book),
            chapters: view
                .tree
                .roots()
                .iter()
                .map(|c| ChapterDto::from(c.as_ref()))
                .collect(),
            session_id: view.session_id,
            user_id: view.user_id,
            selection: view.selection,
            revision: view.revision,
            sync_status: view.sync_status,
            source: view.source.as_str(),
            created_at: view.created_at.to_rfc3339(),
            last_activity: view.last_activity.to_rfc3339(),
        }
    }
}
