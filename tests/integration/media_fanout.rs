use serde_json::json;

use crate::common::TestServer;

#[tokio::test]
async fn voice_chunk_fans_out_to_co_members_but_not_sender() {
    let server = TestServer::start().await;

    let mut alice = server.connect_control().await;
    alice.register_and_login("alice", "pw").await;
    let mut bob = server.connect_control().await;
    bob.register_and_login("bob", "pw").await;
    let mut carol = server.connect_control().await;
    carol.register_and_login("carol", "pw").await;

    alice
        .send(json!({"action": "create_room", "room": "vc", "kind": "voice"}))
        .await;
    alice.recv().await;
    for user in ["bob", "carol"] {
        alice
            .send(json!({"action": "invite_room", "room": "vc", "username": user}))
            .await;
        alice.recv().await;
    }
    bob.recv().await; // invite_received push
    carol.recv().await;

    bob.send(json!({"action": "join_room", "room": "vc"})).await;
    bob.recv().await;
    carol.send(json!({"action": "join_room", "room": "vc"})).await;
    carol.recv().await;

    let mut alice_media = server.connect_media().await;
    alice_media
        .send(json!({"action": "media_login", "username": "alice"}))
        .await;
    assert_eq!(alice_media.recv().await["ok"], true);
    let mut bob_media = server.connect_media().await;
    bob_media
        .send(json!({"action": "media_login", "username": "bob"}))
        .await;
    assert_eq!(bob_media.recv().await["ok"], true);
    let mut carol_media = server.connect_media().await;
    carol_media
        .send(json!({"action": "media_login", "username": "carol"}))
        .await;
    assert_eq!(carol_media.recv().await["ok"], true);

    alice_media
        .send(json!({"action": "voice_chunk", "target": "room:vc", "audio": "AAAA"}))
        .await;

    let bob_frame = bob_media.recv().await;
    assert_eq!(bob_frame["action"], "voice_chunk");
    assert_eq!(bob_frame["from"], "alice");
    assert_eq!(bob_frame["target"], "room:vc");
    assert_eq!(bob_frame["audio"], "AAAA");

    let carol_frame = carol_media.recv().await;
    assert_eq!(carol_frame["from"], "alice");
}

#[tokio::test]
async fn media_login_before_control_login_is_rejected() {
    let server = TestServer::start().await;
    let mut media = server.connect_media().await;
    media
        .send(json!({"action": "media_login", "username": "ghost"}))
        .await;
    let resp = media.recv().await;
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"], "not_authenticated");
}
