//! Export Handler

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;

use crate::application::{ExportMarkdown, ExportResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

use super::session::SessionIdRequest;

/// 导出当前书籍为 Markdown 附件
pub async fn export_markdown(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionIdRequest>,
) -> Result<Response, ApiError> {
    let export = state
        .export_markdown_handler
        .handle(ExportMarkdown {
            session_id: req.session_id,
        })
        .await?;

    tracing::info!(
        book_id = %export.book_id,
        file_name = %export.file_name,
        bytes = export.content.len(),
        "Markdown exported"
    );

    attachment(export)
}

fn content_disposition(export: &ExportResponse) -> String {
    // 旧客户端只认 filename，中文文件名走 filename*
    format!(
        "attachment; filename=\"{}.md\"; filename*=UTF-8''{}",
        export.book_id,
        utf8_percent_encode(&export.file_name, NON_ALPHANUMERIC)
    )
}

fn attachment(export: ExportResponse) -> Result<Response, ApiError> {
    let disposition = content_disposition(&export);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/markdown; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(export.content.into())
        .map_err(|e| ApiError::Internal(format!("Failed to build export response: {}", e)))
}
