//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                  GET   健康检查
//! - /api/book/list             GET   书籍目录
//! - /api/session/open          POST  打开编辑会话
//! - /api/session/get           POST  会话视图（章节树、选中项、同步状态）
//! - /api/session/close         POST  关闭会话
//! - /api/session/sign_in       POST  登录
//! - /api/session/sign_out      POST  登出
//! - /api/session/select_book   POST  切换书籍
//! - /api/session/select        POST  选中章节或封面
//! - /api/chapter/find          POST  查找章节
//! - /api/chapter/flatten       POST  扁平化章节列表
//! - /api/chapter/rename        POST  重命名
//! - /api/chapter/set_content   POST  修改正文
//! - /api/chapter/toggle        POST  展开/折叠
//! - /api/chapter/insert        POST  插入章节（自动编号）
//! - /api/chapter/delete        POST  删除章节（含子章节）
//! - /api/export/markdown       POST  导出 Markdown
//! - /api/snapshot/load         POST  读取快照（远程存储协议）
//! - /api/snapshot/save         POST  保存快照（远程存储协议）
//! - /ws/session/{id}           WS    会话事件
//! - /ws/events                 WS    全局同步事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::{AppState, SnapshotStoreState};
use crate::application::SnapshotStorePort;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/session/:session_id", get(handlers::websocket_handler))
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/book", book_routes())
        .nest("/session", session_routes())
        .nest("/chapter", chapter_routes())
        .route("/export/markdown", post(handlers::export_markdown))
        .nest("/snapshot", snapshot_store_routes())
}

/// Book 路由
fn book_routes() -> Router<Arc<AppState>> {
    Router::new().route("/list", get(handlers::list_books))
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/open", post(handlers::open_session))
        .route("/get", post(handlers::get_session))
        .route("/close", post(handlers::close_session))
        .route("/sign_in", post(handlers::sign_in))
        .route("/sign_out", post(handlers::sign_out))
        .route("/select_book", post(handlers::select_book))
        .route("/select", post(handlers::select_chapter))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/find", post(handlers::find_chapter))
        .route("/flatten", post(handlers::flatten_chapters))
        .route("/rename", post(handlers::rename_chapter))
        .route("/set_content", post(handlers::set_chapter_content))
        .route("/toggle", post(handlers::toggle_chapter))
        .route("/insert", post(handlers::insert_chapter))
        .route("/delete", post(handlers::delete_chapter))
}

/// Snapshot 路由
fn snapshot_store_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/load", post(handlers::load_snapshot))
        .route("/save", post(handlers::save_snapshot))
}

/// 只暴露快照存储的独立路由
pub fn snapshot_routes(store: Arc<dyn SnapshotStorePort>) -> Router {
    Router::new()
        .route("/api/snapshot/load", post(handlers::load_snapshot))
        .route("/api/snapshot/save", post(handlers::save_snapshot))
        .with_state(SnapshotStoreState(store))
}
