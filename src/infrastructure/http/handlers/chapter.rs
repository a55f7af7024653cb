//! Chapter Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{ChapterEdit, EditChapterCommand, FindChapter, FlattenChapters};
use crate::domain::chapter::{ChapterId, InsertPosition};
use crate::infrastructure::http::dto::{ApiResponse, ChapterDto, FlatEntryDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

use super::session::SessionIdRequest;

#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub session_id: String,
    pub chapter_id: String,
}

/// 编辑结果
#[derive(Debug, Serialize)]
pub struct EditResponseDto {
    /// 引用的章节不存在时为 false
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<String>,
    pub revision: u64,
}

async fn apply_edit(
    state: &AppState,
    session_id: String,
    edit: ChapterEdit,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let result = state
        .edit_chapter_handler
        .handle(EditChapterCommand { session_id, edit })
        .await?;

    Ok(Json(ApiResponse::success(EditResponseDto {
        changed: result.changed,
        created_id: result.created.map(|id| id.to_string()),
        revision: result.revision,
    })))
}

// ============================================================================
// Queries
// ============================================================================

pub async fn find_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<ChapterDto>>, ApiError> {
    let chapter = state
        .find_chapter_handler
        .handle(FindChapter {
            session_id: req.session_id,
            chapter_id: ChapterId::from(req.chapter_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(ChapterDto::from(&chapter))))
}

pub async fn flatten_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionIdRequest>,
) -> Result<Json<ApiResponse<Vec<FlatEntryDto>>>, ApiError> {
    let entries = state
        .flatten_chapters_handler
        .handle(FlattenChapters {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        entries.iter().map(FlatEntryDto::from).collect(),
    )))
}

// ============================================================================
// Edits
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub session_id: String,
    pub chapter_id: String,
    pub title: String,
}

pub async fn rename_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let edit = ChapterEdit::Rename {
        id: ChapterId::from(req.chapter_id),
        title: req.title,
    };
    apply_edit(&state, req.session_id, edit).await
}

#[derive(Debug, Deserialize)]
pub struct SetContentRequest {
    pub session_id: String,
    pub chapter_id: String,
    pub content: String,
}

pub async fn set_chapter_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetContentRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let edit = ChapterEdit::SetContent {
        id: ChapterId::from(req.chapter_id),
        content: req.content,
    };
    apply_edit(&state, req.session_id, edit).await
}

pub async fn toggle_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let edit = ChapterEdit::ToggleOpen {
        id: ChapterId::from(req.chapter_id),
    };
    apply_edit(&state, req.session_id, edit).await
}

pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChapterRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let edit = ChapterEdit::Delete {
        id: ChapterId::from(req.chapter_id),
    };
    apply_edit(&state, req.session_id, edit).await
}

/// 插入位置
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// 作为 anchor 的下一个兄弟
    After,
    /// 作为 anchor 的最后一个子章节
    Into,
    /// 追加到根级末尾
    Root,
}

#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub session_id: String,
    pub mode: InsertMode,
    #[serde(default)]
    pub anchor_id: Option<String>,
}

impl InsertRequest {
    fn position(&self) -> Result<InsertPosition, ApiError> {
        let anchor = || {
            self.anchor_id
                .as_deref()
                .map(ChapterId::from)
                .ok_or_else(|| ApiError::BadRequest("anchor_id is required for this mode".to_string()))
        };
        match self.mode {
            InsertMode::After => Ok(InsertPosition::After(anchor()?)),
            InsertMode::Into => Ok(InsertPosition::Into(anchor()?)),
            InsertMode::Root => Ok(InsertPosition::Root),
        }
    }
}

pub async fn insert_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InsertRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let position = req.position()?;
    apply_edit(&state, req.session_id, ChapterEdit::Insert { position }).await
}
