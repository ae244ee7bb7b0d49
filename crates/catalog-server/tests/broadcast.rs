//! Integration tests for the broadcast hub.
//!
//! Connections are driven directly through their outbound receivers, the
//! same way the WebSocket session loop drains them.

use std::time::Duration;

use tokio::sync::mpsc;

use catalog_server::hub::{BroadcastHub, Connection, ConnectionState, HubConfig};

fn hub() -> BroadcastHub {
    BroadcastHub::spawn(HubConfig::default())
}

async fn join(hub: &BroadcastHub, capacity: usize) -> (Connection, mpsc::Receiver<String>) {
    let (conn, rx) = Connection::open(capacity);
    hub.register(conn.clone()).await.unwrap();
    (conn, rx)
}

fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test]
async fn message_reaches_every_connection_including_sender_once() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 8).await;
    let (_b, mut b_rx) = join(&hub, 8).await;
    let (_c, mut c_rx) = join(&hub, 8).await;

    let delivered = hub.broadcast(a.id(), "hello").await.unwrap();
    assert_eq!(delivered, 3);

    assert_eq!(drain(&mut a_rx), vec!["hello"]);
    assert_eq!(drain(&mut b_rx), vec!["hello"]);
    assert_eq!(drain(&mut c_rx), vec!["hello"]);
}

#[tokio::test]
async fn payload_is_relayed_verbatim() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 8).await;
    let payload = "  {\"not\": \"parsed\"}\nline two ✓ ";

    hub.broadcast(a.id(), payload).await.unwrap();
    assert_eq!(drain(&mut a_rx), vec![payload.to_string()]);
}

#[tokio::test]
async fn unregister_is_idempotent_and_stops_delivery() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 8).await;
    let (b, mut b_rx) = join(&hub, 8).await;

    hub.unregister(b.id()).await.unwrap();
    hub.unregister(b.id()).await.unwrap();
    assert_eq!(hub.connection_count().await.unwrap(), 1);

    assert_eq!(hub.broadcast(a.id(), "after").await.unwrap(), 1);
    assert_eq!(drain(&mut a_rx), vec!["after"]);
    assert!(drain(&mut b_rx).is_empty());
}

#[tokio::test]
async fn closing_connection_is_skipped_silently() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 8).await;
    let (b, mut b_rx) = join(&hub, 8).await;

    b.begin_close();
    assert_eq!(b.state(), ConnectionState::Closing);

    assert_eq!(hub.broadcast(a.id(), "skip b").await.unwrap(), 1);
    assert_eq!(drain(&mut a_rx), vec!["skip b"]);
    assert!(drain(&mut b_rx).is_empty());
}

#[tokio::test]
async fn abrupt_disconnect_is_pruned_from_registry() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 8).await;
    let (_b, b_rx) = join(&hub, 8).await;
    drop(b_rx);

    assert_eq!(hub.broadcast(a.id(), "one").await.unwrap(), 1);
    assert_eq!(hub.connection_count().await.unwrap(), 1);
    assert_eq!(drain(&mut a_rx), vec!["one"]);
}

#[tokio::test]
async fn slow_connection_does_not_stall_others() {
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 16).await;
    let (_slow, mut slow_rx) = join(&hub, 1).await;

    for i in 0..5 {
        let delivered = tokio::time::timeout(
            Duration::from_secs(1),
            hub.broadcast(a.id(), format!("m{i}")),
        )
        .await
        .expect("broadcast must not wait on a full queue")
        .unwrap();
        assert_eq!(delivered, if i == 0 { 2 } else { 1 });
    }

    assert_eq!(drain(&mut a_rx), vec!["m0", "m1", "m2", "m3", "m4"]);
    assert_eq!(drain(&mut slow_rx), vec!["m0"]);
    // Still registered: a full queue is not a disconnect.
    assert_eq!(hub.connection_count().await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_senders_produce_one_order_for_everyone() {
    const PER_SENDER: usize = 50;
    let hub = hub();
    let (a, mut a_rx) = join(&hub, 256).await;
    let (b, mut b_rx) = join(&hub, 256).await;
    let (_c, mut c_rx) = join(&hub, 256).await;

    let mut tasks = Vec::new();
    for (label, id) in [("a", a.id()), ("b", b.id())] {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..PER_SENDER {
                hub.broadcast(id, format!("{label}{i}")).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let seen_a = drain(&mut a_rx);
    let seen_b = drain(&mut b_rx);
    let seen_c = drain(&mut c_rx);
    assert_eq!(seen_a.len(), 2 * PER_SENDER);
    assert_eq!(seen_a, seen_b);
    assert_eq!(seen_a, seen_c);

    // Each sender's own messages keep their send order.
    let from_a: Vec<&String> = seen_a.iter().filter(|m| m.starts_with('a')).collect();
    let expected: Vec<String> = (0..PER_SENDER).map(|i| format!("a{i}")).collect();
    assert_eq!(from_a, expected.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn reconnect_is_a_new_connection() {
    let hub = hub();
    let (first, first_rx) = join(&hub, 4).await;
    first.begin_close();
    hub.unregister(first.id()).await.unwrap();
    first.finish_close();
    drop(first_rx);
    assert_eq!(first.state(), ConnectionState::Closed);

    let (second, mut second_rx) = join(&hub, 4).await;
    assert_ne!(second.id(), first.id());
    assert!(second.is_open());
    assert_eq!(hub.broadcast(second.id(), "back").await.unwrap(), 1);
    assert_eq!(drain(&mut second_rx), vec!["back"]);
}
