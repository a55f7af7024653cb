//! HTTP Server
//!
//! Axum HTTP 服务器启动、配置和关闭顺序

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::info;

use super::middleware::{error_logging_middleware, SESSION_ID_HEADER};
use super::routes::create_routes;
use super::state::AppState;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 服务器停止后需要关闭的后台任务
pub struct BackgroundTask {
    name: &'static str,
    stop: Box<dyn FnOnce() + Send>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// `stop` 通知任务退出，之后等待 `handle` 结束
    pub fn new(name: &'static str, stop: impl FnOnce() + Send + 'static, handle: JoinHandle<()>) -> Self {
        Self {
            name,
            stop: Box::new(stop),
            handle,
        }
    }

    async fn shutdown(self) {
        (self.stop)();
        match self.handle.await {
            Ok(()) => info!(task = self.name, "Background task stopped"),
            Err(e) => tracing::error!(task = self.name, error = %e, "Background task failed"),
        }
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
    background: Vec<BackgroundTask>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self {
            config,
            state,
            background: Vec::new(),
        }
    }

    /// 注册后台任务；服务器停止后按注册顺序逐个关闭
    ///
    /// 快照同步 Worker 应最后注册，这样其他任务关闭期间提交的快照也会被刷新。
    pub fn with_background_task(mut self, task: BackgroundTask) -> Self {
        self.background.push(task);
        self
    }

    /// 构建 Router
    pub fn build_router(&self) -> Router {
        // CORS 配置 - 允许所有来源的跨域请求
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, SESSION_ID_HEADER])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        // 整本书的快照随请求体上传，正文较长时可达数 MB
        create_routes()
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器，`shutdown_signal` 完成后停止接收请求并关闭后台任务
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr()).await?;
        self.serve(listener, shutdown_signal).await
    }

    async fn serve<F>(self, listener: TcpListener, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        info!(
            addr = %listener.local_addr()?,
            backend = self.state.snapshot_store.backend_name(),
            background_tasks = self.background.len(),
            "Starting HTTP server (with graceful shutdown)"
        );

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await;

        // 即使 serve 出错也要关闭后台任务，同步 Worker 需要刷新待保存快照
        info!(
            open_sessions = self.state.session_manager.list_all().len(),
            "HTTP server stopped"
        );
        for task in self.background {
            task.shutdown().await;
        }

        served
    }
}
