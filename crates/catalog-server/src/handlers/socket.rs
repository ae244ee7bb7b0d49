//! WebSocket transport for the broadcast hub.
//!
//! Each upgraded socket becomes one [`Connection`]. The session loop
//! forwards inbound frames to the hub and drains the connection's outbound
//! queue into the socket. The session owns the lifecycle: when the peer
//! closes or the transport fails, the connection moves to closing, is
//! unregistered, then moves to closed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::mpsc;

use crate::hub::{BroadcastHub, Connection, ConnectionId};
use crate::state::AppState;

/// Upgrades the request to a WebSocket attached to the broadcast hub.
///
/// `GET /ws` (and `GET /` on the dedicated broadcast listener)
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| run_session(socket, hub))
}

async fn run_session(mut socket: WebSocket, hub: BroadcastHub) {
    let (connection, mut outbound) = Connection::open(hub.outbound_capacity());
    let id = connection.id();
    if hub.register(connection.clone()).await.is_err() {
        tracing::warn!(connection = %id, "broadcast hub unavailable, dropping socket");
        return;
    }

    pump(&mut socket, &mut outbound, &hub, id).await;

    connection.begin_close();
    if hub.unregister(id).await.is_err() {
        tracing::debug!(connection = %id, "broadcast hub already stopped");
    }
    connection.finish_close();
    tracing::info!(connection = %id, "websocket connection closed");
}

/// Runs until the peer goes away.
async fn pump(
    socket: &mut WebSocket,
    outbound: &mut mpsc::Receiver<String>,
    hub: &BroadcastHub,
    id: ConnectionId,
) {
    loop {
        tokio::select! {
            inbound = socket.recv() => {
                let payload = match inbound {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                    // Pings are answered by the transport.
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Err(err)) => {
                        tracing::debug!(connection = %id, "websocket receive failed: {}", err);
                        return;
                    }
                };
                tracing::debug!(connection = %id, "message received: {}", payload);
                if hub.broadcast(id, payload).await.is_err() {
                    return;
                }
            }
            queued = outbound.recv() => {
                let Some(payload) = queued else { return };
                if let Err(err) = socket.send(Message::Text(payload.into())).await {
                    tracing::debug!(connection = %id, "websocket send failed: {}", err);
                    return;
                }
            }
        }
    }
}
