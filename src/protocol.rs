//! Control Gateway request/response shapes and the shared target-auth helper.
//!
//! Grounded on the teacher's `models.rs` per-route typed-payload convention
//! (`CreateRoom`, `SendMessage`, ...), generalized into one internally
//! tagged sum type since every control request crosses the wire through a
//! single dispatch point instead of many HTTP routes.

use serde::Deserialize;

use crate::error::wire;
use crate::models::Kind;
use crate::store::Store;

fn default_kind() -> Kind {
    Kind::Text
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    Register {
        username: String,
        password: String,
    },
    Login {
        username: String,
        password: String,
    },
    Heartbeat {},
    ListUsers {},
    ListRooms {},
    ListChats {},
    ListInvites {},
    CreateRoom {
        room: String,
        #[serde(default = "default_kind")]
        kind: Kind,
    },
    JoinRoom {
        room: String,
    },
    InviteRoom {
        room: String,
        username: String,
    },
    CreateChat {
        username: String,
        #[serde(default = "default_kind")]
        kind: Kind,
    },
    AcceptChat {
        chat: String,
    },
    DeclineRoomInvite {
        room: String,
    },
    DeclineChatInvite {
        chat: String,
    },
    SendMessage {
        target: String,
        kind: String,
        text: Option<String>,
        filename: Option<String>,
        content: Option<String>,
    },
    ListMessages {
        target: String,
        limit: Option<usize>,
    },
    ListMembers {
        target: String,
    },
    Logout {},
}

/// The two valid target-key prefixes, per the glossary's "Target key".
pub enum Target {
    Room(String),
    Chat(String),
}

impl Target {
    pub fn parse(raw: &str) -> Option<Target> {
        if let Some(name) = raw.strip_prefix("room:") {
            Some(Target::Room(name.to_string()))
        } else if let Some(id) = raw.strip_prefix("chat:") {
            Some(Target::Chat(id.to_string()))
        } else {
            None
        }
    }

    pub fn as_key(&self) -> String {
        match self {
            Target::Room(name) => format!("room:{name}"),
            Target::Chat(id) => format!("chat:{id}"),
        }
    }
}

/// Resolves `target_key` (`room:<x>` or `chat:<y>`) to its sorted member
/// list, used both to authorize a message/media send and to drive fan-out.
/// Returns `Err(error code)` for an unparseable prefix or a nonexistent
/// target.
pub fn target_members(store: &Store, target_key: &str) -> Result<Vec<String>, &'static str> {
    match Target::parse(target_key) {
        Some(Target::Room(name)) => {
            if store.room_exists(&name) {
                Ok(store.get_room_members(&name))
            } else {
                Err(wire::MISSING_ROOM)
            }
        }
        Some(Target::Chat(id)) => {
            if store.chat_exists(&id) {
                Ok(store.get_chat_members(&id))
            } else {
                Err(wire::MISSING_CHAT)
            }
        }
        None => Err(wire::UNKNOWN_TARGET),
    }
}

/// `true` iff `username` is a member/participant of `target_key`'s target.
pub fn is_member(store: &Store, target_key: &str, username: &str) -> bool {
    match Target::parse(target_key) {
        Some(Target::Room(name)) => store.room_has_member(&name, username),
        Some(Target::Chat(id)) => store.chat_has_member(&id, username),
        None => false,
    }
}
