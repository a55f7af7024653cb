//! Snapshot Handlers
//!
//! 远程快照存储协议的服务端。`HttpSnapshotStore` 作为客户端调用这里。

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::application::ports::{ChapterRecord, SnapshotKey, StoredSnapshot, MAX_REVISION};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::SnapshotStoreState;

#[derive(Debug, Deserialize)]
pub struct LoadSnapshotRequest {
    pub user_id: String,
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSnapshotRequest {
    pub user_id: String,
    pub book_id: String,
    pub revision: u64,
    #[serde(default)]
    pub chapters: Vec<ChapterRecord>,
}

fn snapshot_key(user_id: String, book_id: String) -> Result<SnapshotKey, ApiError> {
    if user_id.trim().is_empty() || book_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "user_id and book_id must not be empty".to_string(),
        ));
    }
    Ok(SnapshotKey::new(user_id, book_id))
}

/// 加载快照，不存在时 errno=404
pub async fn load_snapshot(
    State(SnapshotStoreState(store)): State<SnapshotStoreState>,
    Json(req): Json<LoadSnapshotRequest>,
) -> Result<Json<ApiResponse<StoredSnapshot>>, ApiError> {
    let key = snapshot_key(req.user_id, req.book_id)?;

    match store.load_snapshot(&key).await? {
        Some(snapshot) => Ok(Json(ApiResponse::success(snapshot))),
        None => Err(ApiError::NotFound(format!("Snapshot not found: {}", key))),
    }
}

/// 保存快照，revision 不大于已存储值时 errno=409
pub async fn save_snapshot(
    State(SnapshotStoreState(store)): State<SnapshotStoreState>,
    Json(req): Json<SaveSnapshotRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let key = snapshot_key(req.user_id, req.book_id)?;
    if req.revision > MAX_REVISION {
        return Err(ApiError::BadRequest(format!(
            "revision must not exceed {}",
            MAX_REVISION
        )));
    }
    let snapshot = StoredSnapshot {
        revision: req.revision,
        chapters: req.chapters,
    };

    store.save_snapshot(&key, &snapshot).await?;

    tracing::debug!(key = %key, revision = snapshot.revision, "Snapshot saved via API");
    Ok(Json(ApiResponse::ok()))
}
