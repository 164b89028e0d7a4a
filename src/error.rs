//! Fatal startup errors and the wire-level error-code taxonomy.

use std::path::PathBuf;

/// Errors that can only occur while opening or persisting the store file.
/// These are fatal: the process must refuse to start (or must abort a write)
/// rather than paper over corrupt state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store file {path} has a non-object root")]
    InvalidRoot { path: PathBuf },

    #[error("checksum mismatch in {path}: expected {expected}, computed {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Wire-level error codes from the request/response protocol's error
/// taxonomy. These are returned verbatim in the `error` field of a failure
/// response and never wrapped in a Rust error type, since nothing ever
/// matches on them beyond string equality with the wire value.
pub mod wire {
    pub const MISSING_CREDENTIALS: &str = "missing_credentials";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const ALREADY_ONLINE: &str = "already_online";
    pub const NOT_AUTHENTICATED: &str = "not_authenticated";

    pub const USER_NOT_FOUND: &str = "user_not_found";
    pub const MISSING_ROOM: &str = "missing_room";
    pub const MISSING_CHAT: &str = "missing_chat";
    pub const MISSING_TARGET: &str = "missing_target";
    pub const MISSING_USERNAME: &str = "missing_username";
    pub const MISSING_PARAMETERS: &str = "missing_parameters";
    pub const MISSING_TEXT: &str = "missing_text";
    pub const MISSING_ATTACHMENT: &str = "missing_attachment";
    pub const UNKNOWN_MESSAGE_KIND: &str = "unknown_message_kind";
    pub const UNKNOWN_ACTION: &str = "unknown_action";
    pub const UNKNOWN_TARGET: &str = "unknown_target";

    pub const NOT_ROOM_MEMBER: &str = "not_room_member";
    pub const NOT_CHAT_MEMBER: &str = "not_chat_member";
    pub const INVITE_REQUIRED: &str = "invite_required";

    pub const INVITE_EXPIRED: &str = "invite_expired";

    pub const INVALID_JSON: &str = "invalid_json";
    pub const MISSING_PAYLOAD: &str = "missing_payload";
}
