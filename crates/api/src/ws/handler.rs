use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::protocol::{parse_command, Action, Reply};

/// GET /api/v1/ws -- upgrade to a status notification socket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Serve one socket: outbound frames come from the manager channel,
/// inbound text frames are subscription commands.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = ws_manager.add(conn_id.clone()).await;
    tracing::info!(conn_id = %conn_id, "Notification socket opened");

    let (mut sink, mut stream) = socket.split();

    let forward = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "Notification socket read failed");
                break;
            }
        };
        ws_manager.touch(&conn_id).await;

        match frame {
            Message::Text(text) => {
                let reply = apply_command(&ws_manager, &conn_id, text.as_str()).await;
                ws_manager
                    .send_to(&conn_id, Message::Text(reply.to_text().into()))
                    .await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    ws_manager.remove(&conn_id).await;
    forward.abort();
    tracing::info!(conn_id = %conn_id, "Notification socket closed");
}

async fn apply_command(ws_manager: &WsManager, conn_id: &str, text: &str) -> Reply {
    let command = match parse_command(text) {
        Ok(command) => command,
        Err(reply) => return reply,
    };
    match command.action {
        Action::Subscribe => ws_manager.subscribe(conn_id, &command.topic).await,
        Action::Unsubscribe => ws_manager.unsubscribe(conn_id, &command.topic).await,
    };
    tracing::debug!(conn_id, action = ?command.action, topic = %command.topic, "Subscription changed");
    Reply::Ack {
        action: command.action,
        topic: command.topic,
    }
}
