//! HTTP Middleware
//!
//! 请求日志中间件：按编辑会话打标签，记录 4xx/5xx 状态码

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

/// 客户端可选携带的会话 ID 头，用于日志关联
pub const SESSION_ID_HEADER: HeaderName = HeaderName::from_static("x-session-id");

const SESSION_SOCKET_PREFIX: &str = "/ws/session/";

/// 从请求中取出编辑会话 ID
///
/// 优先取 `x-session-id` 头，其次取会话 WebSocket 路径中的 ID。
pub fn request_session_id(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get(&SESSION_ID_HEADER) {
        return value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from);
    }

    request
        .uri()
        .path()
        .strip_prefix(SESSION_SOCKET_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .map(String::from)
}

/// 请求日志中间件
///
/// 整个请求在带 `session_id` 的 span 中执行，handler 内的业务错误日志
/// （errno != 0，在 ApiError::into_response() 中记录）因此可以按会话检索。
/// 请求带会话头时原样回写到响应。
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let session_id = request_session_id(&request);
    let started = Instant::now();

    let span = tracing::info_span!(
        "request",
        session_id = session_id.as_deref().unwrap_or("-"),
    );
    let mut response = next.run(request).instrument(span.clone()).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let _entered = span.enter();
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    } else {
        tracing::debug!(method = %method, uri = %uri, elapsed_ms, "HTTP request served");
    }

    if let Some(value) = session_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
        response.headers_mut().insert(SESSION_ID_HEADER, value);
    }

    response
}
