//! WebSocket tests against a live listener.
//!
//! The router is served on an ephemeral port and real clients connect to
//! `/ws`, so the upgrade, the session loop and the hub are exercised
//! together.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use catalog_server::router::build_router;
use catalog_server::state::AppState;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state, None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    client
}

/// Polls the hub until it reports `expected` connections.
async fn wait_for_connections(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if state.hub.connection_count().await.unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("hub never reached the expected connection count");
}

/// Next text frame, skipping control frames.
async fn next_text(client: &mut Client) -> String {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                other => panic!("expected a text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("no text frame arrived")
}

#[tokio::test]
async fn text_is_echoed_to_sender_and_relayed_to_peers() {
    let state = AppState::in_memory();
    let addr = serve(state.clone()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    a.send(Message::text("hi")).await.unwrap();

    assert_eq!(next_text(&mut a).await, "hi");
    assert_eq!(next_text(&mut b).await, "hi");
}

#[tokio::test]
async fn binary_frames_are_relayed_as_lossy_text() {
    let state = AppState::in_memory();
    let addr = serve(state.clone()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    a.send(Message::binary(vec![0x68, 0xff])).await.unwrap();

    assert_eq!(next_text(&mut b).await, "h\u{FFFD}");
    assert_eq!(next_text(&mut a).await, "h\u{FFFD}");
}

#[tokio::test]
async fn closed_client_is_unregistered_and_peers_keep_receiving() {
    let state = AppState::in_memory();
    let addr = serve(state.clone()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    a.close(None).await.unwrap();
    wait_for_connections(&state, 1).await;

    b.send(Message::text("still here")).await.unwrap();
    assert_eq!(next_text(&mut b).await, "still here");
}

#[tokio::test]
async fn dropped_client_is_unregistered() {
    let state = AppState::in_memory();
    let addr = serve(state.clone()).await;
    let a = connect(addr).await;
    let _b = connect(addr).await;
    wait_for_connections(&state, 2).await;

    drop(a);
    wait_for_connections(&state, 1).await;
}
