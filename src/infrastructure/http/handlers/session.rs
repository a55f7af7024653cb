//! Session Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    CloseSessionCommand, GetSession, OpenSessionCommand, SelectBookCommand, SelectChapterCommand,
    SignInCommand, SignOutCommand,
};
use crate::domain::chapter::ChapterId;
use crate::domain::Selection;
use crate::infrastructure::http::dto::{ApiResponse, Empty, SessionViewDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionIdRequest {
    pub session_id: String,
}

async fn session_view(state: &AppState, session_id: String) -> Result<SessionViewDto, ApiError> {
    let view = state
        .get_session_handler
        .handle(GetSession { session_id })
        .await?;
    Ok(SessionViewDto::from(view))
}

// ============================================================================
// Open / Get / Close
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub book_id: Option<String>,
}

pub async fn open_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenSessionRequest>,
) -> Result<Json<ApiResponse<SessionViewDto>>, ApiError> {
    let cmd = OpenSessionCommand {
        user_id: req.user_id,
        book_id: req.book_id,
    };

    let result = state.open_session_handler.handle(cmd).await?;
    let view = session_view(&state, result.session_id).await?;

    Ok(Json(ApiResponse::success(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionIdRequest>,
) -> Result<Json<ApiResponse<SessionViewDto>>, ApiError> {
    let view = session_view(&state, req.session_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .close_session_handler
        .handle(CloseSessionCommand {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Sign in / out
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub session_id: String,
    pub user_id: String,
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<ApiResponse<SessionViewDto>>, ApiError> {
    let result = state
        .sign_in_handler
        .handle(SignInCommand {
            session_id: req.session_id,
            user_id: req.user_id,
        })
        .await?;

    let view = session_view(&state, result.session_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionIdRequest>,
) -> Result<Json<ApiResponse<SessionViewDto>>, ApiError> {
    state
        .sign_out_handler
        .handle(SignOutCommand {
            session_id: req.session_id.clone(),
        })
        .await?;

    let view = session_view(&state, req.session_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

// ============================================================================
// Book / selection
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectBookRequest {
    pub session_id: String,
    pub book_id: String,
}

pub async fn select_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectBookRequest>,
) -> Result<Json<ApiResponse<SessionViewDto>>, ApiError> {
    let result = state
        .select_book_handler
        .handle(SelectBookCommand {
            session_id: req.session_id,
            book_id: req.book_id,
        })
        .await?;

    let view = session_view(&state, result.session_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub session_id: String,
    /// 缺省时选中封面
    #[serde(default)]
    pub chapter_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponseDto {
    pub applied: bool,
    pub selection: Selection,
}

pub async fn select_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ApiResponse<SelectResponseDto>>, ApiError> {
    let selection = match req.chapter_id {
        Some(id) => Selection::Chapter(ChapterId::from(id)),
        None => Selection::Cover,
    };

    let result = state
        .select_chapter_handler
        .handle(SelectChapterCommand {
            session_id: req.session_id,
            selection,
        })
        .await?;

    Ok(Json(ApiResponse::success(SelectResponseDto {
        applied: result.applied,
        selection: result.selection,
    })))
}
