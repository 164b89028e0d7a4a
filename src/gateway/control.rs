//! Control Gateway: per-connection request loop, authentication, dispatch.
//!
//! Grounded on `examples/other_examples/.../connection/registration.rs` for
//! the raw-TCP accept-loop-plus-per-connection-task shape and its pattern of
//! writing directly to a peer's connection from inside another connection's
//! handler; dispatch semantics follow spec section 4.3.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex as AsyncMutex;

use crate::codec::{read_line, write_json, CodecError};
use crate::error::wire;
use crate::models::{Kind, MessagePayload};
use crate::protocol::{is_member, Request};
use crate::session::{SessionRegistry, Writer};
use crate::store::Store;

/// Accepts connections on `listener` forever, one task per connection.
pub async fn serve(
    listener: TcpListener,
    store: Arc<Store>,
    registry: Arc<SessionRegistry>,
) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let store = store.clone();
        let registry = registry.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, store, registry).await {
                tracing::warn!(%peer, error = %err, "control connection ended with error");
            }
        });
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    store: Arc<Store>,
    registry: Arc<SessionRegistry>,
) -> Result<(), CodecError> {
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let writer: Writer = Arc::new(AsyncMutex::new(write_half));

    let mut username: Option<String> = None;

    loop {
        let line = match read_line(&mut reader).await {
            Ok(line) => line,
            Err(CodecError::Eof) => break,
            Err(err) => {
                tracing::debug!(error = %err, "control read error");
                break;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(_) => {
                let mut w = writer.lock().await;
                write_json(&mut *w, &json!({"ok": false, "error": wire::INVALID_JSON})).await?;
                continue;
            }
        };

        let response = dispatch(&value, &store, &registry, &mut username, &writer).await;
        let is_logout = response.get("action").and_then(|v| v.as_str()) == Some("logout")
            && response.get("ok").and_then(|v| v.as_bool()) == Some(true);
        {
            let mut w = writer.lock().await;
            write_json(&mut *w, &response).await?;
        }
        if is_logout {
            break;
        }
    }

    if let Some(u) = username {
        store.set_offline(&u);
        registry.set_offline(&u);
        tracing::info!(user = %u, "control session closed");
    }

    let mut w = writer.lock().await;
    let _ = w.shutdown().await;
    Ok(())
}

async fn dispatch(
    value: &serde_json::Value,
    store: &Store,
    registry: &SessionRegistry,
    username: &mut Option<String>,
    writer: &Writer,
) -> serde_json::Value {
    let action = match value.get("action").and_then(|v| v.as_str()) {
        Some(a) => a,
        None => return json!({"ok": false, "error": wire::UNKNOWN_ACTION}),
    };

    let request: Request = match serde_json::from_value(value.clone()) {
        Ok(req) => req,
        Err(_) if is_known_action(action) => {
            return json!({"ok": false, "error": wire::MISSING_PARAMETERS, "action": action});
        }
        Err(_) => return json!({"ok": false, "error": wire::UNKNOWN_ACTION}),
    };

    // `register` and `login` are the only actions allowed unauthenticated.
    if username.is_none() && !matches!(request, Request::Register { .. } | Request::Login { .. }) {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    }

    match request {
        Request::Register { username: u, password } => handle_register(store, &u, &password),
        Request::Login { username: u, password } => {
            handle_login(store, registry, username, &u, &password, writer).await
        }
        Request::Heartbeat {} => handle_heartbeat(store, username.as_deref()),
        Request::ListUsers {} => handle_list_users(store),
        Request::ListRooms {} => handle_list_rooms(store, username.as_deref()),
        Request::ListChats {} => handle_list_chats(store, username.as_deref()),
        Request::ListInvites {} => handle_list_invites(store, username.as_deref()),
        Request::CreateRoom { room, kind } => handle_create_room(store, username.as_deref(), &room, kind),
        Request::JoinRoom { room } => handle_join_room(store, username.as_deref(), &room),
        Request::InviteRoom { room, username: target } => {
            handle_invite_room(store, registry, username.as_deref(), &room, &target).await
        }
        Request::CreateChat { username: target, kind } => {
            handle_create_chat(store, registry, username.as_deref(), &target, kind).await
        }
        Request::AcceptChat { chat } => handle_accept_chat(store, username.as_deref(), &chat),
        Request::DeclineRoomInvite { room } => handle_decline_room_invite(store, username.as_deref(), &room),
        Request::DeclineChatInvite { chat } => handle_decline_chat_invite(store, username.as_deref(), &chat),
        Request::SendMessage { target, kind, text, filename, content } => {
            handle_send_message(store, username.as_deref(), &target, &kind, text, filename, content)
        }
        Request::ListMessages { target, limit } => handle_list_messages(store, username.as_deref(), &target, limit),
        Request::ListMembers { target } => handle_list_members(store, username.as_deref(), &target),
        Request::Logout {} => json!({"ok": true, "action": "logout"}),
    }
}

fn is_known_action(action: &str) -> bool {
    matches!(
        action,
        "register" | "login" | "heartbeat" | "list_users" | "list_rooms" | "list_chats"
            | "list_invites" | "create_room" | "join_room" | "invite_room" | "create_chat"
            | "accept_chat" | "decline_room_invite" | "decline_chat_invite" | "send_message"
            | "list_messages" | "list_members" | "logout"
    )
}

fn handle_register(store: &Store, username: &str, password: &str) -> serde_json::Value {
    if username.is_empty() || password.is_empty() {
        return json!({"ok": false, "error": wire::MISSING_CREDENTIALS});
    }
    let ok = store.register_user(username, password);
    json!({"ok": ok, "action": "register"})
}

async fn handle_login(
    store: &Store,
    registry: &SessionRegistry,
    username: &mut Option<String>,
    candidate: &str,
    password: &str,
    writer: &Writer,
) -> serde_json::Value {
    if candidate.is_empty() || password.is_empty() {
        return json!({"ok": false, "error": wire::MISSING_CREDENTIALS});
    }
    if !store.user_exists(candidate) {
        return json!({"ok": false, "error": wire::USER_NOT_FOUND});
    }
    if registry.is_online(candidate) {
        return json!({"ok": false, "error": wire::ALREADY_ONLINE});
    }
    if !store.validate_login(candidate, password) {
        return json!({"ok": false, "error": wire::INVALID_CREDENTIALS});
    }

    registry.set_online(candidate, writer.clone());
    store.set_online(candidate);
    *username = Some(candidate.to_string());

    let users = list_users_payload(store);
    let rooms = list_rooms_payload(store, candidate);
    let chats = list_chats_payload(store, candidate);
    // Read-only: login must not sweep/persist expired invites, or the
    // one-shot eviction report `list_invites` owns would be consumed here
    // before the client ever sees it.
    let room_invites = store.peek_room_invites(candidate);
    let chat_invites = store.peek_chat_invites(candidate);

    json!({
        "ok": true,
        "action": "login",
        "users": users,
        "rooms": rooms,
        "chats": chats,
        "invites": {
            "rooms": room_invites,
            "chats": chat_invites,
        },
    })
}

fn handle_heartbeat(store: &Store, username: Option<&str>) -> serde_json::Value {
    if let Some(u) = username {
        store.touch(u);
    }
    json!({"ok": true, "action": "heartbeat"})
}

fn list_users_payload(store: &Store) -> serde_json::Value {
    let users = store.list_users_with_status();
    json!(users
        .into_iter()
        .map(|(u, s)| json!({"username": u, "online": s.online, "last_seen": s.last_seen}))
        .collect::<Vec<_>>())
}

fn handle_list_users(store: &Store) -> serde_json::Value {
    json!({"ok": true, "action": "list_users", "users": list_users_payload(store)})
}

fn list_rooms_payload(store: &Store, username: &str) -> serde_json::Value {
    json!(store
        .list_rooms_for_user(username)
        .into_iter()
        .map(|(room, kind)| json!({"room": room, "kind": kind}))
        .collect::<Vec<_>>())
}

fn handle_list_rooms(store: &Store, username: Option<&str>) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    json!({"ok": true, "action": "list_rooms", "rooms": list_rooms_payload(store, u)})
}

fn list_chats_payload(store: &Store, username: &str) -> serde_json::Value {
    json!(store
        .list_chats_for_user(username)
        .into_iter()
        .map(|(chat, kind)| json!({"chat": chat, "kind": kind}))
        .collect::<Vec<_>>())
}

fn handle_list_chats(store: &Store, username: Option<&str>) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    json!({"ok": true, "action": "list_chats", "chats": list_chats_payload(store, u)})
}

fn handle_list_invites(store: &Store, username: Option<&str>) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    let (rooms, expired_rooms) = store.list_room_invites(u);
    let (chats, expired_chats) = store.list_chat_invites(u);
    let mut response = json!({
        "ok": true,
        "action": "list_invites",
        "invites": {"rooms": rooms, "chats": chats},
        "expired": {"rooms": expired_rooms, "chats": expired_chats},
    });
    // Informational: an expiry occurred during this call's sweep. Callers
    // must treat this as informational, not failure — `ok` stays true.
    if !response["expired"]["rooms"].as_array().unwrap().is_empty()
        || !response["expired"]["chats"].as_array().unwrap().is_empty()
    {
        response["error"] = json!(wire::INVITE_EXPIRED);
    }
    response
}

fn handle_create_room(store: &Store, username: Option<&str>, room: &str, kind: Kind) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if room.is_empty() {
        return json!({"ok": false, "error": wire::MISSING_ROOM});
    }
    let ok = store.create_room(room, u, kind);
    json!({"ok": ok, "action": "create_room", "room": room, "kind": kind})
}

fn handle_join_room(store: &Store, username: Option<&str>, room: &str) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if !store.room_exists(room) {
        return json!({"ok": false, "error": wire::MISSING_ROOM});
    }
    if store.room_has_member(room, u) {
        let kind = store.get_room_kind(room);
        return json!({"ok": true, "action": "join_room", "room": room, "kind": kind});
    }
    let (present, expired) = store.has_room_invite(u, room);
    if expired {
        return json!({"ok": false, "error": wire::INVITE_EXPIRED, "action": "join_room", "room": room});
    }
    if !present {
        return json!({"ok": false, "error": wire::INVITE_REQUIRED, "action": "join_room", "room": room});
    }
    store.add_room_member(room, u);
    let kind = store.get_room_kind(room);
    json!({"ok": true, "action": "join_room", "room": room, "kind": kind})
}

async fn handle_invite_room(
    store: &Store,
    registry: &SessionRegistry,
    username: Option<&str>,
    room: &str,
    target: &str,
) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if !store.room_exists(room) {
        return json!({"ok": false, "error": wire::MISSING_ROOM});
    }
    if !store.room_has_member(room, u) {
        return json!({"ok": false, "error": wire::NOT_ROOM_MEMBER});
    }
    if !store.user_exists(target) {
        return json!({"ok": false, "error": wire::USER_NOT_FOUND});
    }
    let invited_at = store.invite_to_room(room, target);
    push(registry, target, json!({
        "action": "invite_received",
        "invite_type": "room",
        "room": room,
        "kind": store.get_room_kind(room),
        "invited_at": invited_at,
        "from": u,
    }))
    .await;
    json!({"ok": true, "action": "invite_room", "room": room, "username": target})
}

async fn handle_create_chat(
    store: &Store,
    registry: &SessionRegistry,
    username: Option<&str>,
    target: &str,
    kind: Kind,
) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if !store.user_exists(target) {
        return json!({"ok": false, "error": wire::USER_NOT_FOUND});
    }
    let chat_id = store.create_chat(u, target, kind);
    let invited_at = store.invite_to_chat(&chat_id, target);
    push(registry, target, json!({
        "action": "invite_received",
        "invite_type": "chat",
        "chat": chat_id,
        "kind": kind,
        "invited_at": invited_at,
        "from": u,
    }))
    .await;
    json!({"ok": true, "action": "create_chat", "chat": chat_id, "kind": kind})
}

fn handle_accept_chat(store: &Store, username: Option<&str>, chat: &str) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if !store.chat_exists(chat) {
        return json!({"ok": false, "error": wire::MISSING_CHAT});
    }
    let (present, expired) = store.has_chat_invite(u, chat);
    if expired {
        return json!({"ok": false, "error": wire::INVITE_EXPIRED, "action": "accept_chat", "chat": chat});
    }
    if !present {
        return json!({"ok": false, "error": wire::INVITE_REQUIRED, "action": "accept_chat", "chat": chat});
    }
    let (accepted, expired_now) = store.accept_chat_invite(u, chat);
    if expired_now || !accepted {
        return json!({"ok": false, "error": wire::INVITE_EXPIRED, "action": "accept_chat", "chat": chat});
    }
    let kind = store.get_chat_kind(chat);
    json!({"ok": true, "action": "accept_chat", "chat": chat, "kind": kind})
}

fn handle_decline_room_invite(store: &Store, username: Option<&str>, room: &str) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    let removed = store.decline_room_invite(u, room);
    json!({"ok": removed, "action": "decline_room_invite", "room": room})
}

fn handle_decline_chat_invite(store: &Store, username: Option<&str>, chat: &str) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    let removed = store.decline_chat_invite(u, chat);
    json!({"ok": removed, "action": "decline_chat_invite", "chat": chat})
}

fn handle_send_message(
    store: &Store,
    username: Option<&str>,
    target: &str,
    kind: &str,
    text: Option<String>,
    filename: Option<String>,
    content: Option<String>,
) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if crate::protocol::Target::parse(target).is_none() {
        return json!({"ok": false, "error": wire::UNKNOWN_TARGET});
    }
    if !is_member(store, target, u) {
        let err = if target.starts_with("room:") { wire::NOT_ROOM_MEMBER } else { wire::NOT_CHAT_MEMBER };
        return json!({"ok": false, "error": err});
    }
    let payload = match kind {
        "text" => match text.filter(|t| !t.is_empty()) {
            Some(text) => MessagePayload::Text { text },
            None => return json!({"ok": false, "error": wire::MISSING_TEXT}),
        },
        "file" | "image" => {
            let (Some(filename), Some(content)) = (filename, content) else {
                return json!({"ok": false, "error": wire::MISSING_ATTACHMENT});
            };
            if kind == "file" {
                MessagePayload::File { filename, content }
            } else {
                MessagePayload::Image { filename, content }
            }
        }
        _ => return json!({"ok": false, "error": wire::UNKNOWN_MESSAGE_KIND}),
    };
    store.add_message(target, u, payload);
    json!({"ok": true, "action": "send_message", "target": target, "kind": kind})
}

fn handle_list_messages(store: &Store, username: Option<&str>, target: &str, limit: Option<usize>) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    if crate::protocol::Target::parse(target).is_none() {
        return json!({"ok": false, "error": wire::UNKNOWN_TARGET});
    }
    if !is_member(store, target, u) {
        let err = if target.starts_with("room:") { wire::NOT_ROOM_MEMBER } else { wire::NOT_CHAT_MEMBER };
        return json!({"ok": false, "error": err});
    }
    let messages = store.list_messages(target, limit);
    json!({"ok": true, "action": "list_messages", "target": target, "messages": messages})
}

fn handle_list_members(store: &Store, username: Option<&str>, target: &str) -> serde_json::Value {
    let Some(u) = username else {
        return json!({"ok": false, "error": wire::NOT_AUTHENTICATED});
    };
    match crate::protocol::target_members(store, target) {
        Ok(members) => {
            if !members.iter().any(|m| m == u) {
                let err = if target.starts_with("room:") { wire::NOT_ROOM_MEMBER } else { wire::NOT_CHAT_MEMBER };
                return json!({"ok": false, "error": err});
            }
            json!({"ok": true, "action": "list_members", "target": target, "members": members})
        }
        Err(code) => json!({"ok": false, "error": code}),
    }
}

/// Fire-and-forget push to `target`'s control writer, if online. Failure is
/// logged and not surfaced to the caller.
async fn push(registry: &SessionRegistry, target: &str, value: serde_json::Value) {
    let Some(writer) = registry.control_writer(target) else {
        return;
    };
    let mut w = writer.lock().await;
    if let Err(err) = write_json(&mut *w, &value).await {
        tracing::warn!(user = %target, error = %err, "failed to deliver push notification");
    }
}
