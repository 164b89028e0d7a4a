//! Durable JSON-backed state store.
//!
//! Grounded on `examples/original_source/server/storage.py` for operation
//! semantics (normalization, chat-id derivation, legacy invite tolerance)
//! and on the teacher's `db.rs` for the single-mutex-around-a-struct shape.
//! Every mutating operation here is synchronous and completes with one
//! atomic file replace; callers must never call these from inside an
//! `.await` that could suspend mid-operation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::models::{Chat, Invite, Kind, Message, MessagePayload, Room, Status, User};

const INVITE_TTL: Duration = Duration::from_secs(300);
const FORMAT: &str = "rcord-db";
const VERSION: u32 = 1;

fn utc_now() -> String {
    Utc::now().to_rfc3339()
}

/// Sorts two usernames and joins them with `:` to form a chat id.
pub fn chat_id_for(a: &str, b: &str) -> String {
    let mut pair = [a, b];
    pair.sort();
    format!("{}:{}", pair[0], pair[1])
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserInvites {
    #[serde(default)]
    pub rooms: Vec<Invite>,
    #[serde(default)]
    pub chats: Vec<Invite>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvitesSection {
    #[serde(default)]
    pub users: HashMap<String, UserInvites>,
}

/// The `data` half of the persisted wrapper.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub rooms: HashMap<String, Room>,
    #[serde(default)]
    pub chats: HashMap<String, Chat>,
    #[serde(default)]
    pub messages: HashMap<String, Vec<Message>>,
    #[serde(default)]
    pub invites: InvitesSection,
    #[serde(default)]
    pub status: HashMap<String, Status>,
}

impl StoreData {
    /// Fills in missing per-user collections so the rest of the code never
    /// has to null-check them.
    fn normalize(&mut self) {
        for username in self.users.keys().cloned().collect::<Vec<_>>() {
            self.invites.users.entry(username.clone()).or_default();
            self.status.entry(username).or_insert_with(|| Status {
                online: false,
                last_seen: utc_now(),
            });
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Wrapper {
    format: String,
    version: u32,
    data: StoreData,
    checksum: String,
}

/// Recursively sorts object keys so two structurally-equal values always
/// serialize to the same bytes, regardless of insertion order.
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, serde_json::Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k.clone(), canonicalize(v));
            }
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

fn checksum_of(data: &StoreData) -> Result<String, StoreError> {
    let value = serde_json::to_value(data).expect("StoreData always serializes");
    let canonical = canonicalize(&value);
    let bytes = serde_json::to_vec(&canonical).expect("canonical value always serializes");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub struct Store {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl Store {
    /// Opens the store at `path`, creating it with empty collections if
    /// missing. Fails loudly (rather than silently rewriting) on a
    /// checksum mismatch or a non-object root — these are the only fatal
    /// Store errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Store, StoreError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let mut data = StoreData::default();
            data.normalize();
            let store = Store {
                path: path.clone(),
                data: Mutex::new(data),
            };
            store.persist_locked(&store.data.lock().unwrap())?;
            return Ok(store);
        }

        let bytes = fs::read(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let root: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?;

        if !root.is_object() {
            return Err(StoreError::InvalidRoot { path });
        }

        let mut data = if let (Some(format), Some(checksum)) =
            (root.get("format"), root.get("checksum"))
        {
            let _ = format;
            let checksum = checksum.as_str().unwrap_or_default().to_string();
            let data_value = root.get("data").cloned().unwrap_or(serde_json::json!({}));
            let canonical = canonicalize(&data_value);
            let bytes = serde_json::to_vec(&canonical).expect("canonical value serializes");
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != checksum {
                return Err(StoreError::ChecksumMismatch {
                    path,
                    expected: checksum,
                    actual,
                });
            }
            serde_json::from_value(data_value).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?
        } else {
            // Legacy bare object: the whole root is the data.
            serde_json::from_value(root).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?
        };

        data.normalize();

        let store = Store {
            path: path.clone(),
            data: Mutex::new(data),
        };
        // Legacy files are normalized and rewrapped on next write; since we
        // just read one that may be bare, persist immediately so the
        // on-disk form is always canonical.
        store.persist_locked(&store.data.lock().unwrap())?;
        Ok(store)
    }

    fn persist_locked(&self, data: &StoreData) -> Result<(), StoreError> {
        let checksum = checksum_of(data)?;
        let wrapper = Wrapper {
            format: FORMAT.to_string(),
            version: VERSION,
            data: data.clone(),
            checksum,
        };
        let json = serde_json::to_string_pretty(&wrapper).expect("wrapper always serializes");

        let tmp_path = {
            let mut p = self.path.clone().into_os_string();
            p.push(".tmp");
            PathBuf::from(p)
        };
        fs::write(&tmp_path, json.as_bytes()).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    fn with_data<R>(&self, f: impl FnOnce(&mut StoreData) -> R) -> R {
        let mut guard = self.data.lock().unwrap();
        f(&mut guard)
    }

    /// Read-modify-write: runs `f`, then persists if it returns `true`.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreData) -> (R, bool)) -> R {
        let mut guard = self.data.lock().unwrap();
        let (result, dirty) = f(&mut guard);
        if dirty {
            self.persist_locked(&guard).expect("store write must succeed");
        }
        result
    }

    // --- users -----------------------------------------------------------

    pub fn register_user(&self, username: &str, password: &str) -> bool {
        self.mutate(|data| {
            if data.users.contains_key(username) {
                return (false, false);
            }
            data.users.insert(
                username.to_string(),
                User {
                    password: password.to_string(),
                    created_at: utc_now(),
                },
            );
            data.invites
                .users
                .entry(username.to_string())
                .or_default();
            data.status.insert(
                username.to_string(),
                Status {
                    online: false,
                    last_seen: utc_now(),
                },
            );
            (true, true)
        })
    }

    pub fn validate_login(&self, username: &str, password: &str) -> bool {
        self.with_data(|data| {
            data.users
                .get(username)
                .is_some_and(|u| u.password == password)
        })
    }

    pub fn user_exists(&self, username: &str) -> bool {
        self.with_data(|data| data.users.contains_key(username))
    }

    pub fn list_users(&self) -> Vec<String> {
        self.with_data(|data| {
            let mut names: Vec<String> = data.users.keys().cloned().collect();
            names.sort();
            names
        })
    }

    pub fn list_users_with_status(&self) -> Vec<(String, Status)> {
        self.with_data(|data| {
            let mut out: Vec<(String, Status)> = data
                .users
                .keys()
                .map(|u| {
                    let status = data.status.get(u).cloned().unwrap_or(Status {
                        online: false,
                        last_seen: utc_now(),
                    });
                    (u.clone(), status)
                })
                .collect();
            out.sort_by(|a, b| a.0.cmp(&b.0));
            out
        })
    }

    // --- presence ----------------------------------------------------------

    pub fn set_online(&self, username: &str) {
        self.mutate(|data| {
            data.status.insert(
                username.to_string(),
                Status {
                    online: true,
                    last_seen: utc_now(),
                },
            );
            ((), true)
        })
    }

    pub fn set_offline(&self, username: &str) {
        self.mutate(|data| {
            if let Some(status) = data.status.get_mut(username) {
                status.online = false;
                status.last_seen = utc_now();
                return ((), true);
            }
            ((), false)
        })
    }

    pub fn touch(&self, username: &str) {
        self.mutate(|data| {
            if let Some(status) = data.status.get_mut(username) {
                status.last_seen = utc_now();
                return ((), true);
            }
            ((), false)
        })
    }

    pub fn get_status(&self, username: &str) -> Option<Status> {
        self.with_data(|data| data.status.get(username).cloned())
    }

    /// Usernames currently marked online whose `last_seen` is older than
    /// `timeout`. Used by the Presence Monitor sweep.
    pub fn stale_online_users(&self, timeout: Duration) -> Vec<String> {
        self.with_data(|data| {
            let now = Utc::now();
            let threshold = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::zero());
            data.status
                .iter()
                .filter(|(_, s)| s.online)
                .filter(|(_, s)| match DateTime::parse_from_rfc3339(&s.last_seen) {
                    Ok(ts) => (now - ts.with_timezone(&Utc)) > threshold,
                    Err(_) => false,
                })
                .map(|(u, _)| u.clone())
                .collect()
        })
    }

    // --- rooms -------------------------------------------------------------

    pub fn create_room(&self, room: &str, owner: &str, kind: Kind) -> bool {
        self.mutate(|data| {
            if data.rooms.contains_key(room) {
                return (false, false);
            }
            data.rooms.insert(
                room.to_string(),
                Room {
                    members: vec![owner.to_string()],
                    created_at: utc_now(),
                    kind,
                },
            );
            (true, true)
        })
    }

    pub fn add_room_member(&self, room: &str, username: &str) -> bool {
        self.mutate(|data| {
            remove_expired_invites(data, username);
            let Some(room_data) = data.rooms.get_mut(room) else {
                return (false, false);
            };
            if !room_data.members.contains(&username.to_string()) {
                room_data.members.push(username.to_string());
            }
            let invites = data.invites.users.entry(username.to_string()).or_default();
            invites.rooms.retain(|inv| inv.target() != room);
            (true, true)
        })
    }

    pub fn room_exists(&self, room: &str) -> bool {
        self.with_data(|data| data.rooms.contains_key(room))
    }

    pub fn room_has_member(&self, room: &str, username: &str) -> bool {
        self.with_data(|data| {
            data.rooms
                .get(room)
                .is_some_and(|r| r.members.iter().any(|m| m == username))
        })
    }

    pub fn get_room_members(&self, room: &str) -> Vec<String> {
        self.with_data(|data| {
            let mut members = data
                .rooms
                .get(room)
                .map(|r| r.members.clone())
                .unwrap_or_default();
            members.sort();
            members
        })
    }

    pub fn get_room_kind(&self, room: &str) -> Option<Kind> {
        self.with_data(|data| data.rooms.get(room).map(|r| r.kind))
    }

    pub fn list_rooms_for_user(&self, username: &str) -> Vec<(String, Kind)> {
        self.with_data(|data| {
            let mut rooms: Vec<(String, Kind)> = data
                .rooms
                .iter()
                .filter(|(_, r)| r.members.iter().any(|m| m == username))
                .map(|(name, r)| (name.clone(), r.kind))
                .collect();
            rooms.sort_by(|a, b| a.0.cmp(&b.0));
            rooms
        })
    }

    // --- chats ---------------------------------------------------------

    pub fn create_chat(&self, requester: &str, target: &str, kind: Kind) -> String {
        self.mutate(|data| {
            let chat_id = chat_id_for(requester, target);
            let dirty = match data.chats.get_mut(&chat_id) {
                Some(chat) => {
                    if !chat.participants.contains(&requester.to_string()) {
                        chat.participants.push(requester.to_string());
                        true
                    } else {
                        false
                    }
                }
                None => {
                    data.chats.insert(
                        chat_id.clone(),
                        Chat {
                            participants: vec![requester.to_string()],
                            created_at: utc_now(),
                            kind,
                        },
                    );
                    true
                }
            };
            (chat_id, dirty)
        })
    }

    pub fn chat_exists(&self, chat_id: &str) -> bool {
        self.with_data(|data| data.chats.contains_key(chat_id))
    }

    pub fn chat_has_member(&self, chat_id: &str, username: &str) -> bool {
        self.with_data(|data| {
            data.chats
                .get(chat_id)
                .is_some_and(|c| c.participants.iter().any(|p| p == username))
        })
    }

    pub fn get_chat_members(&self, chat_id: &str) -> Vec<String> {
        self.with_data(|data| {
            let mut members = data
                .chats
                .get(chat_id)
                .map(|c| c.participants.clone())
                .unwrap_or_default();
            members.sort();
            members
        })
    }

    pub fn get_chat_kind(&self, chat_id: &str) -> Option<Kind> {
        self.with_data(|data| data.chats.get(chat_id).map(|c| c.kind))
    }

    pub fn list_chats_for_user(&self, username: &str) -> Vec<(String, Kind)> {
        self.with_data(|data| {
            let mut chats: Vec<(String, Kind)> = data
                .chats
                .iter()
                .filter(|(_, c)| c.participants.iter().any(|p| p == username))
                .map(|(id, c)| (id.clone(), c.kind))
                .collect();
            chats.sort_by(|a, b| a.0.cmp(&b.0));
            chats
        })
    }

    /// `(accepted, expired)`: `expired` is true iff the invite had already
    /// lapsed and was evicted by this call's sweep. `accepted` is true iff
    /// the user is now (or already was) a participant.
    pub fn accept_chat_invite(&self, username: &str, chat_id: &str) -> (bool, bool) {
        self.mutate(|data| {
            let (_, expired_chats) = remove_expired_invites(data, username);
            if expired_chats.iter().any(|c| c == chat_id) {
                return ((false, true), true);
            }
            let Some(chat) = data.chats.get_mut(chat_id) else {
                return ((false, false), true);
            };
            if !chat.participants.contains(&username.to_string()) {
                chat.participants.push(username.to_string());
            }
            chat.participants.sort();
            chat.participants.dedup();
            let invites = data.invites.users.entry(username.to_string()).or_default();
            invites.chats.retain(|inv| inv.target() != chat_id);
            ((true, false), true)
        })
    }

    // --- invites ---------------------------------------------------------

    pub fn invite_to_room(&self, room: &str, username: &str) -> Option<String> {
        self.mutate(|data| {
            if !data.rooms.contains_key(room) {
                return (None, false);
            }
            remove_expired_invites(data, username);
            let invites = data.invites.users.entry(username.to_string()).or_default();
            if let Some(existing) = invites.rooms.iter().find(|i| i.target() == room) {
                return (existing.invited_at().map(String::from), true);
            }
            let invited_at = utc_now();
            invites.rooms.push(Invite::Canonical {
                target: room.to_string(),
                invited_at: invited_at.clone(),
            });
            (Some(invited_at), true)
        })
    }

    pub fn invite_to_chat(&self, chat_id: &str, username: &str) -> Option<String> {
        self.mutate(|data| {
            if !data.chats.contains_key(chat_id) {
                return (None, false);
            }
            remove_expired_invites(data, username);
            let invites = data.invites.users.entry(username.to_string()).or_default();
            if let Some(existing) = invites.chats.iter().find(|i| i.target() == chat_id) {
                return (existing.invited_at().map(String::from), true);
            }
            let invited_at = utc_now();
            invites.chats.push(Invite::Canonical {
                target: chat_id.to_string(),
                invited_at: invited_at.clone(),
            });
            (Some(invited_at), true)
        })
    }

    /// `(present, expired)` for a single target. This is a read-only check:
    /// it neither evicts nor persists, so an expired invite it reports is
    /// still there for a subsequent `list_invites` to sweep and report.
    pub fn has_room_invite(&self, username: &str, room: &str) -> (bool, bool) {
        self.with_data(|data| {
            let Some(inv) = data
                .invites
                .users
                .get(username)
                .and_then(|i| i.rooms.iter().find(|inv| inv.target() == room))
            else {
                return (false, false);
            };
            if is_invite_expired(inv) {
                (false, true)
            } else {
                (true, false)
            }
        })
    }

    pub fn has_chat_invite(&self, username: &str, chat_id: &str) -> (bool, bool) {
        self.with_data(|data| {
            let Some(inv) = data
                .invites
                .users
                .get(username)
                .and_then(|i| i.chats.iter().find(|inv| inv.target() == chat_id))
            else {
                return (false, false);
            };
            if is_invite_expired(inv) {
                (false, true)
            } else {
                (true, false)
            }
        })
    }

    /// Non-mutating, non-evicting view of a user's current room/chat
    /// invites, filtered to non-expired ones. Used by `login`'s response,
    /// which must not start the one-shot eviction-report cycle that
    /// `list_invites` owns.
    pub fn peek_room_invites(&self, username: &str) -> Vec<RoomInviteView> {
        self.with_data(|data| {
            let mut out: Vec<RoomInviteView> = data
                .invites
                .users
                .get(username)
                .map(|i| {
                    i.rooms
                        .iter()
                        .filter(|inv| !is_invite_expired(inv))
                        .map(|inv| RoomInviteView {
                            room: inv.target().to_string(),
                            invited_at: inv.invited_at().map(String::from),
                            kind: data
                                .rooms
                                .get(inv.target())
                                .map(|r| r.kind)
                                .unwrap_or(Kind::Text),
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.sort_by(|a, b| a.room.cmp(&b.room));
            out
        })
    }

    pub fn peek_chat_invites(&self, username: &str) -> Vec<ChatInviteView> {
        self.with_data(|data| {
            let mut out: Vec<ChatInviteView> = data
                .invites
                .users
                .get(username)
                .map(|i| {
                    i.chats
                        .iter()
                        .filter(|inv| !is_invite_expired(inv))
                        .map(|inv| ChatInviteView {
                            chat: inv.target().to_string(),
                            invited_at: inv.invited_at().map(String::from),
                            kind: data
                                .chats
                                .get(inv.target())
                                .map(|c| c.kind)
                                .unwrap_or(Kind::Text),
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.sort_by(|a, b| a.chat.cmp(&b.chat));
            out
        })
    }

    pub fn decline_room_invite(&self, username: &str, room: &str) -> bool {
        self.mutate(|data| {
            let Some(invites) = data.invites.users.get_mut(username) else {
                return (false, false);
            };
            let before = invites.rooms.len();
            invites.rooms.retain(|inv| inv.target() != room);
            let removed = invites.rooms.len() != before;
            (removed, removed)
        })
    }

    pub fn decline_chat_invite(&self, username: &str, chat_id: &str) -> bool {
        self.mutate(|data| {
            let Some(invites) = data.invites.users.get_mut(username) else {
                return (false, false);
            };
            let before = invites.chats.len();
            invites.chats.retain(|inv| inv.target() != chat_id);
            let removed = invites.chats.len() != before;
            (removed, removed)
        })
    }

    /// Listing used by the `list_invites` action: room invites with kind,
    /// normalizing legacy bare entries to a null `invited_at`.
    pub fn list_room_invites(&self, username: &str) -> (Vec<RoomInviteView>, Vec<String>) {
        self.mutate(|data| {
            let (expired, _) = remove_expired_invites(data, username);
            let mut out: Vec<RoomInviteView> = data
                .invites
                .users
                .get(username)
                .map(|i| {
                    i.rooms
                        .iter()
                        .map(|inv| RoomInviteView {
                            room: inv.target().to_string(),
                            invited_at: inv.invited_at().map(String::from),
                            kind: data
                                .rooms
                                .get(inv.target())
                                .map(|r| r.kind)
                                .unwrap_or(Kind::Text),
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.sort_by(|a, b| a.room.cmp(&b.room));
            ((out, expired), !expired.is_empty())
        })
    }

    pub fn list_chat_invites(&self, username: &str) -> (Vec<ChatInviteView>, Vec<String>) {
        self.mutate(|data| {
            let (_, expired) = remove_expired_invites(data, username);
            let mut out: Vec<ChatInviteView> = data
                .invites
                .users
                .get(username)
                .map(|i| {
                    i.chats
                        .iter()
                        .map(|inv| ChatInviteView {
                            chat: inv.target().to_string(),
                            invited_at: inv.invited_at().map(String::from),
                            kind: data
                                .chats
                                .get(inv.target())
                                .map(|c| c.kind)
                                .unwrap_or(Kind::Text),
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.sort_by(|a, b| a.chat.cmp(&b.chat));
            ((out, expired), !expired.is_empty())
        })
    }

    /// Explicit sweep returning the evicted targets, per the
    /// `cleanup_expired_invites` contract.
    pub fn cleanup_expired_invites(&self, username: &str) -> (Vec<String>, Vec<String>) {
        self.mutate(|data| {
            let evicted = remove_expired_invites(data, username);
            let dirty = !evicted.0.is_empty() || !evicted.1.is_empty();
            (evicted, dirty)
        })
    }

    // --- messages ----------------------------------------------------------

    pub fn add_message(&self, target: &str, sender: &str, payload: MessagePayload) {
        self.mutate(|data| {
            data.messages.entry(target.to_string()).or_default().push(Message {
                sender: sender.to_string(),
                ts: utc_now(),
                payload,
            });
            ((), true)
        })
    }

    pub fn list_messages(&self, target: &str, limit: Option<usize>) -> Vec<Message> {
        self.with_data(|data| {
            let all = data.messages.get(target).cloned().unwrap_or_default();
            match limit {
                Some(n) if n < all.len() => all[all.len() - n..].to_vec(),
                _ => all,
            }
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomInviteView {
    pub room: String,
    pub invited_at: Option<String>,
    pub kind: Kind,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatInviteView {
    pub chat: String,
    pub invited_at: Option<String>,
    pub kind: Kind,
}

/// Whether an invite is past `INVITE_TTL`. Legacy bare-string invites have
/// no `invited_at` and are never expired.
fn is_invite_expired(inv: &Invite) -> bool {
    match inv.invited_at() {
        None => false,
        Some(ts) => match DateTime::parse_from_rfc3339(ts) {
            Ok(parsed) => {
                (Utc::now() - parsed.with_timezone(&Utc)).num_seconds()
                    > INVITE_TTL.as_secs() as i64
            }
            Err(_) => false,
        },
    }
}

/// Drops expired invites from one user's bucket in place, returning the
/// evicted `(rooms, chats)` target lists. This is the sole eviction path —
/// callers that only need to know whether an invite is expired (without
/// consuming the one-shot report `list_invites` surfaces) must use
/// [`is_invite_expired`] directly instead of calling this.
fn remove_expired_invites(data: &mut StoreData, username: &str) -> (Vec<String>, Vec<String>) {
    let Some(invites) = data.invites.users.get_mut(username) else {
        return (Vec::new(), Vec::new());
    };

    let mut evicted_rooms = Vec::new();
    invites.rooms.retain(|inv| {
        if is_invite_expired(inv) {
            evicted_rooms.push(inv.target().to_string());
            false
        } else {
            true
        }
    });

    let mut evicted_chats = Vec::new();
    invites.chats.retain(|inv| {
        if is_invite_expired(inv) {
            evicted_chats.push(inv.target().to_string());
            false
        } else {
            true
        }
    });

    (evicted_rooms, evicted_chats)
}
