//! Store entity types.
//!
//! Field sets and the legacy/canonical invite duality follow the original
//! `storage.py`; the derive list (`Serialize, Deserialize, Clone, Debug`)
//! follows the teacher's `models.rs` convention.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Text,
    Voice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub members: Vec<String>,
    pub created_at: String,
    pub kind: Kind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub participants: Vec<String>,
    pub created_at: String,
    pub kind: Kind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessagePayload {
    Text { text: String },
    File { filename: String, content: String },
    Image { filename: String, content: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub ts: String,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub online: bool,
    pub last_seen: String,
}

/// An invite as it appears in a persisted `invites.users.<u>.rooms`/`.chats`
/// array. Legacy files store a bare target-name string with no timestamp;
/// such invites are immortal. Current writes only ever emit
/// [`Invite::Canonical`].
#[derive(Debug, Clone)]
pub enum Invite {
    Legacy { target: String },
    Canonical { target: String, invited_at: String },
}

impl Invite {
    pub fn target(&self) -> &str {
        match self {
            Invite::Legacy { target } => target,
            Invite::Canonical { target, .. } => target,
        }
    }

    pub fn invited_at(&self) -> Option<&str> {
        match self {
            Invite::Legacy { .. } => None,
            Invite::Canonical { invited_at, .. } => Some(invited_at),
        }
    }
}

impl Serialize for Invite {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Only the canonical shape is ever written back out.
        match self {
            // Legacy invites have no timestamp; round-tripping one that was
            // never touched by an expiry sweep keeps it in its bare form.
            Invite::Legacy { target } => serializer.serialize_str(target),
            Invite::Canonical { target, invited_at } => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("target", target)?;
                map.serialize_entry("invited_at", invited_at)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Invite {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bare(String),
            Object {
                #[serde(alias = "room", alias = "chat", alias = "target")]
                target: String,
                invited_at: String,
            },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bare(target) => Ok(Invite::Legacy { target }),
            Raw::Object { target, invited_at } => Ok(Invite::Canonical { target, invited_at }),
        }
    }
}
