//! Media Gateway: a separate listener relaying opaque voice/screen frames.
//!
//! Grounded on `examples/other_examples/.../room.rs`'s `MediaRoom` fan-out
//! shape, adapted from a room-keyed subscriber map to the Session
//! Registry's target-membership lookup, per spec section 4.4.

use std::sync::Arc;

use serde_json::json;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::sync::Mutex as AsyncMutex;

use crate::codec::{read_line, write_json, CodecError};
use crate::error::wire;
use crate::protocol::target_members;
use crate::session::{SessionRegistry, Writer};
use crate::store::Store;

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
                tracing::warn!(%peer, error = %err, "media connection ended with error");
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

    let username = match authenticate(&mut reader, &writer, &registry).await? {
        Some(u) => u,
        None => return Ok(()),
    };
    registry.set_media_writer(&username, writer.clone());
    tracing::info!(user = %username, "media session bound");

    loop {
        let line = match read_line(&mut reader).await {
            Ok(line) => line,
            Err(CodecError::Eof) => break,
            Err(err) => {
                tracing::debug!(error = %err, "media read error");
                break;
            }
        };

        let Ok(value) = serde_json::from_str::<serde_json::Value>(&line) else {
            // Malformed frames are silently discarded on the media path, per spec.
            continue;
        };

        relay_frame(&store, &registry, &username, &value).await;
    }

    Ok(())
}

/// Waits for the first frame to be `media_login{username}` naming an
/// already-authenticated control session. Replies `not_authenticated` and
/// keeps the connection open for retry on failure, per spec section 4.4.
async fn authenticate(
    reader: &mut BufReader<tokio::io::ReadHalf<tokio::net::TcpStream>>,
    writer: &Writer,
    registry: &SessionRegistry,
) -> Result<Option<String>, CodecError> {
    loop {
        let line = match read_line(reader).await {
            Ok(line) => line,
            Err(CodecError::Eof) => return Ok(None),
            Err(err) => return Err(err),
        };

        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(_) => continue,
        };

        if value.get("action").and_then(|v| v.as_str()) != Some("media_login") {
            let mut w = writer.lock().await;
            write_json(&mut *w, &json!({"ok": false, "error": wire::NOT_AUTHENTICATED})).await?;
            continue;
        }

        let Some(username) = value.get("username").and_then(|v| v.as_str()) else {
            let mut w = writer.lock().await;
            write_json(&mut *w, &json!({"ok": false, "error": wire::MISSING_USERNAME})).await?;
            continue;
        };

        if !registry.is_online(username) {
            let mut w = writer.lock().await;
            write_json(&mut *w, &json!({"ok": false, "error": wire::NOT_AUTHENTICATED})).await?;
            continue;
        }

        let mut w = writer.lock().await;
        write_json(&mut *w, &json!({"ok": true, "action": "media_login"})).await?;
        return Ok(Some(username.to_string()));
    }
}

async fn relay_frame(
    store: &Store,
    registry: &SessionRegistry,
    sender: &str,
    value: &serde_json::Value,
) {
    let action = match value.get("action").and_then(|v| v.as_str()) {
        Some(a @ ("voice_chunk" | "screen_frame")) => a,
        _ => return,
    };
    let Some(target) = value.get("target").and_then(|v| v.as_str()) else {
        return;
    };
    let payload_key = if action == "voice_chunk" { "audio" } else { "frame" };
    let Some(payload) = value.get(payload_key).and_then(|v| v.as_str()) else {
        if let Some(writer) = registry.media_writer(sender) {
            let mut w = writer.lock().await;
            let _ = write_json(&mut *w, &json!({"ok": false, "error": wire::MISSING_PAYLOAD})).await;
        }
        return;
    };

    let Ok(members) = target_members(store, target) else {
        return;
    };
    if !members.iter().any(|m| m == sender) {
        return;
    }

    let frame = json!({
        "action": action,
        "from": sender,
        "target": target,
        payload_key: payload,
    });

    // Fan-out is best-effort and concurrent; one recipient's write failure
    // must not affect delivery to the others.
    let handles: Vec<_> = members
        .iter()
        .filter(|m| m.as_str() != sender)
        .filter_map(|m| registry.media_writer(m).map(|w| (m.clone(), w)))
        .map(|(user, writer)| {
            let frame = frame.clone();
            tokio::spawn(async move {
                let mut w = writer.lock().await;
                if let Err(err) = write_json(&mut *w, &frame).await {
                    tracing::warn!(user = %user, error = %err, "media frame delivery failed");
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.await;
    }
}
