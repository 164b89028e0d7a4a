use serde_json::json;

use crate::common::TestServer;

#[tokio::test]
async fn invite_then_join_grants_membership() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;
    let mut bob = server.connect_control().await;
    bob.register_and_login("bob", "pw").await;

    alice
        .send(json!({"action": "create_room", "room": "dev", "kind": "text"}))
        .await;
    let resp = alice.recv().await;
    assert_eq!(resp["ok"], true);

    bob.send(json!({"action": "join_room", "room": "dev"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "invite_required");

    alice
        .send(json!({"action": "invite_room", "room": "dev", "username": "bob"}))
        .await;
    let resp = alice.recv().await;
    assert_eq!(resp["ok"], true);

    // bob receives the push before responding to his own next request
    let push = bob.recv().await;
    assert_eq!(push["action"], "invite_received");
    assert_eq!(push["room"], "dev");

    bob.send(json!({"action": "join_room", "room": "dev"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);

    bob.send(json!({"action": "list_members", "target": "room:dev"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);
    let members: Vec<String> = resp["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(members, vec!["alice".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn create_room_rejects_duplicate_name() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;

    alice
        .send(json!({"action": "create_room", "room": "dev"}))
        .await;
    assert_eq!(alice.recv().await["ok"], true);

    alice
        .send(json!({"action": "create_room", "room": "dev"}))
        .await;
    assert_eq!(alice.recv().await["ok"], false);
}

#[tokio::test]
async fn non_member_cannot_list_members() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;
    alice
        .send(json!({"action": "create_room", "room": "dev"}))
        .await;
    alice.recv().await;

    let mut bob = server.connect_control().await;
    bob.register_and_login("bob", "pw").await;
    bob.send(json!({"action": "list_members", "target": "room:dev"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "not_room_member");
}
