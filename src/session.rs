//! Session Registry: authenticated username → live writers.
//!
//! Grounded on the teacher's `routes/mod.rs` `PresenceTracker`
//! (`Mutex<HashMap<...>>`, join/leave shape) generalized from per-room
//! presence to a per-connection writer registry, and on
//! `examples/other_examples/.../session.rs`'s `SessionPool` for the
//! registry-with-sweep pattern the Presence Monitor drives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::WriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;

/// A connection's outbound half, shared so a push from another task and the
/// connection's own response serialize through the same mutex — only one
/// outstanding write per writer at a time.
pub type Writer = Arc<AsyncMutex<WriteHalf<TcpStream>>>;

#[derive(Default)]
struct Inner {
    control: HashMap<String, Writer>,
    media: HashMap<String, Writer>,
}

/// Maps authenticated usernames to their live control and (optional) media
/// writers. Does not itself track persisted status — callers pair registry
/// mutations with the matching `Store::set_online`/`set_offline` call.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Registers `username`'s control writer, replacing any prior one.
    /// Returns `true` if the user was not already registered.
    pub fn set_online(&self, username: &str, writer: Writer) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let was_new = !inner.control.contains_key(username);
        inner.control.insert(username.to_string(), writer);
        was_new
    }

    pub fn is_online(&self, username: &str) -> bool {
        self.inner.lock().unwrap().control.contains_key(username)
    }

    /// Removes the session and any bound media writer.
    pub fn set_offline(&self, username: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.control.remove(username);
        inner.media.remove(username);
    }

    pub fn control_writer(&self, username: &str) -> Option<Writer> {
        self.inner.lock().unwrap().control.get(username).cloned()
    }

    /// Binds (or replaces) `username`'s media writer.
    pub fn set_media_writer(&self, username: &str, writer: Writer) {
        self.inner
            .lock()
            .unwrap()
            .media
            .insert(username.to_string(), writer);
    }

    pub fn media_writer(&self, username: &str) -> Option<Writer> {
        self.inner.lock().unwrap().media.get(username).cloned()
    }

    pub fn online_usernames(&self) -> Vec<String> {
        self.inner.lock().unwrap().control.keys().cloned().collect()
    }
}
