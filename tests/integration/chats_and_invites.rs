use serde_json::json;

use crate::common::TestServer;

#[tokio::test]
async fn chat_invite_lifecycle() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;
    let mut bob = server.connect_control().await;
    bob.register_and_login("bob", "pw").await;

    alice
        .send(json!({"action": "create_chat", "username": "bob"}))
        .await;
    let resp = alice.recv().await;
    assert_eq!(resp["ok"], true);
    let chat_id = resp["chat"].as_str().unwrap().to_string();
    assert_eq!(chat_id, "alice:bob");

    let push = bob.recv().await;
    assert_eq!(push["action"], "invite_received");
    assert_eq!(push["chat"], chat_id);

    // the invitee is not an implicit participant before accepting
    bob.send(json!({"action": "send_message", "target": format!("chat:{chat_id}"), "kind": "text", "text": "hi"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "not_chat_member");

    bob.send(json!({"action": "accept_chat", "chat": chat_id}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);

    bob.send(json!({"action": "send_message", "target": format!("chat:{chat_id}"), "kind": "text", "text": "hi"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);
}

#[tokio::test]
async fn decline_room_invite_removes_it() {
    let server = TestServer::start().await;
    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;
    let mut bob = server.connect_control().await;
    bob.register_and_login("bob", "pw").await;

    alice
        .send(json!({"action": "create_room", "room": "dev"}))
        .await;
    alice.recv().await;
    alice
        .send(json!({"action": "invite_room", "room": "dev", "username": "bob"}))
        .await;
    alice.recv().await;
    bob.recv().await; // invite_received push

    bob.send(json!({"action": "decline_room_invite", "room": "dev"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);

    bob.send(json!({"action": "join_room", "room": "dev"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["error"], "invite_required");
}

#[tokio::test]
async fn expired_room_invite_is_rejected_and_reported_on_list_invites() {
    // Seed a store where alice owns room `x` and bob already has a room
    // invite to it dated far in the past, simulating TTL expiry without a
    // real 300-second wait.
    let seed = json!({
        "users": {
            "alice": {"password": "pw", "created_at": "2020-01-01T00:00:00+00:00"},
            "bob": {"password": "pw", "created_at": "2020-01-01T00:00:00+00:00"},
        },
        "rooms": {
            "x": {"members": ["alice"], "created_at": "2020-01-01T00:00:00+00:00", "kind": "text"},
        },
        "chats": {},
        "messages": {},
        "invites": {
            "users": {
                "bob": {
                    "rooms": [{"target": "x", "invited_at": "2020-01-01T00:00:00+00:00"}],
                    "chats": [],
                },
            },
        },
        "status": {},
    });

    let server = TestServer::start_with_seed(Some(seed)).await;
    let mut bob = server.connect_control().await;
    bob.send(json!({"action": "login", "username": "bob", "password": "pw"}))
        .await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);

    bob.send(json!({"action": "join_room", "room": "x"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "invite_expired");

    bob.send(json!({"action": "list_invites"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["error"], "invite_expired");
    assert!(resp["expired"]["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "x"));
    assert!(resp["invites"]["rooms"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn legacy_bare_string_invite_never_expires() {
    let seed = json!({
        "users": {
            "alice": {"password": "pw", "created_at": "2020-01-01T00:00:00+00:00"},
            "bob": {"password": "pw", "created_at": "2020-01-01T00:00:00+00:00"},
        },
        "rooms": {
            "x": {"members": ["alice"], "created_at": "2020-01-01T00:00:00+00:00", "kind": "text"},
        },
        "chats": {},
        "messages": {},
        "invites": {
            "users": {
                "bob": {"rooms": ["x"], "chats": []},
            },
        },
        "status": {},
    });

    let server = TestServer::start_with_seed(Some(seed)).await;
    let mut bob = server.connect_control().await;
    bob.send(json!({"action": "login", "username": "bob", "password": "pw"}))
        .await;
    bob.recv().await;

    bob.send(json!({"action": "join_room", "room": "x"})).await;
    let resp = bob.recv().await;
    assert_eq!(resp["ok"], true);
}
