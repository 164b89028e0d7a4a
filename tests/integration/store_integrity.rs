use rcord::store::Store;

use crate::common::temp_store_path;

#[test]
fn reopening_after_writes_preserves_state() {
    let path = temp_store_path();
    {
        let store = Store::open(&path.0).unwrap();
        store.register_user("alice", "pw1");
        store.create_room("dev", "alice", rcord::models::Kind::Text);
    }
    let reopened = Store::open(&path.0).unwrap();
    assert!(reopened.validate_login("alice", "pw1"));
    assert!(reopened.room_has_member("dev", "alice"));
}

#[test]
fn tampered_checksum_is_rejected_on_reopen() {
    let path = temp_store_path();
    {
        let store = Store::open(&path.0).unwrap();
        store.register_user("alice", "pw1");
    }
    let mut raw = std::fs::read_to_string(&path.0).unwrap();
    raw = raw.replace("pw1", "pw9");
    std::fs::write(&path.0, raw).unwrap();

    let result = Store::open(&path.0);
    assert!(result.is_err());
}

#[test]
fn legacy_bare_object_file_is_accepted() {
    let path = temp_store_path();
    let legacy = serde_json::json!({
        "users": {"alice": {"password": "pw1", "created_at": "2020-01-01T00:00:00+00:00"}},
        "rooms": {},
        "chats": {},
        "messages": {},
        "invites": {"users": {}},
        "status": {},
    });
    std::fs::write(&path.0, serde_json::to_vec(&legacy).unwrap()).unwrap();

    let store = Store::open(&path.0).unwrap();
    assert!(store.validate_login("alice", "pw1"));

    // Reopening after the normalize-on-load rewrite should now see the
    // canonical wrapped form and still validate the checksum.
    let reopened = Store::open(&path.0).unwrap();
    assert!(reopened.validate_login("alice", "pw1"));
}
