use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::common::TestServer;

#[tokio::test]
async fn heartbeat_updates_last_seen() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;

    let before = server.store.get_status("alice").unwrap().last_seen;
    tokio::time::sleep(Duration::from_millis(5)).await;
    alice.send(json!({"action": "heartbeat"})).await;
    let resp = alice.recv().await;
    assert_eq!(resp["ok"], true);

    let after = server.store.get_status("alice").unwrap().last_seen;
    assert!(after >= before);
}

#[tokio::test]
async fn monitor_sweep_marks_stale_session_offline() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;

    assert!(server.store.get_status("alice").unwrap().online);

    let monitor = rcord::presence::spawn(
        server.store.clone(),
        Arc::clone(&server.registry),
        Duration::from_millis(20),
        Duration::from_millis(0),
    );
    tokio::time::sleep(Duration::from_millis(80)).await;
    monitor.abort();

    assert!(!server.store.get_status("alice").unwrap().online);
}
