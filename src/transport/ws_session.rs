use crate::game::engine::EngineHandle;
use crate::protocol::decode_client_message;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

/// Drives one client socket: frames from the engine go out through a writer task,
/// inbound text frames are decoded and forwarded. Closing or erroring the socket
/// disconnects the session.
pub async fn handle_socket(socket: WebSocket, engine: EngineHandle) {
    let (mut sender, mut receiver) = socket.split();
    let Some(session) = engine.connect().await else {
        tracing::warn!("engine unavailable, closing socket");
        return;
    };
    let session_id = session.session_id;
    let mut outbound_rx = session.outbound_rx;

    let send_task = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                let Some(message) = decode_client_message(&text) else {
                    tracing::trace!(session_id, "ignoring malformed frame");
                    continue;
                };
                engine.send_message(&session_id, message).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    engine.disconnect(&session_id).await;
    send_task.abort();
}
