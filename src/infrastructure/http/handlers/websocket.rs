//! WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::application::EditorSessionManagerPort;
use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 会话 WebSocket（章节树变更、书籍切换通知）
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session_socket(socket, session_id, state))
}

/// 全局 WebSocket（快照同步结果通知）
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

fn encode(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

fn touch(session_manager: &dyn EditorSessionManagerPort, session_id: &str) {
    if let Err(e) = session_manager.modify(session_id, &mut |session| session.touch()) {
        tracing::debug!(session_id = %session_id, error = %e, "Touch on closed session");
    }
}

async fn handle_session_socket(socket: WebSocket, session_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    if !state.session_manager.is_valid(&session_id) {
        tracing::warn!(session_id = %session_id, "WebSocket connection rejected: invalid session");
        let _ = sender.close().await;
        return;
    }

    let mut event_rx = state.event_publisher.register_session(&session_id);

    tracing::info!(session_id = %session_id, "WebSocket connected");

    let forward_id = session_id.clone();
    let forward_task = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            let closing = matches!(event, WsEvent::SessionClosed { .. });
            let Some(msg) = encode(&event) else {
                continue;
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(session_id = %forward_id, error = %e, "Failed to send WebSocket message");
                break;
            }
            if closing {
                let _ = sender.close().await;
                break;
            }
        }
    });

    // 客户端任何消息都算一次活动
    let session_manager = state.session_manager.clone();
    let receive_id = session_id.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %receive_id, "WebSocket closed by client");
                    break;
                }
                Ok(_) => touch(session_manager.as_ref(), &receive_id),
                Err(e) => {
                    tracing::debug!(session_id = %receive_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    state.event_publisher.unregister_session(&session_id);
    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Global WebSocket connected");

    let forward_task = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            if !matches!(
                event,
                WsEvent::SnapshotSaved { .. } | WsEvent::SnapshotFailed { .. }
            ) {
                continue;
            }
            let Some(msg) = encode(&event) else {
                continue;
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send global WebSocket message");
                break;
            }
        }
    });

    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Global WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Global WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Global WebSocket disconnected");
}
