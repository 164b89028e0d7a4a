//! Presence Monitor: periodic sweep marking stale sessions offline.
//!
//! Grounded on the teacher's `retention::spawn_retention_task` (spawn +
//! initial delay + `loop { sleep; sweep }` shape) and
//! `examples/other_examples/.../session.rs`'s `SessionPool::cleanup`.

use std::sync::Arc;
use std::time::Duration;

use crate::session::SessionRegistry;
use crate::store::Store;

/// Spawns the background sweep task. Every `check_interval`, any user
/// currently marked online whose `last_seen` exceeds `heartbeat_timeout` has
/// their control writer closed and is marked offline — the only mechanism
/// that reclaims sessions whose peer vanished without a graceful close.
pub fn spawn(
    store: Arc<Store>,
    registry: Arc<SessionRegistry>,
    check_interval: Duration,
    heartbeat_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(check_interval).await;
            sweep(&store, &registry, heartbeat_timeout).await;
        }
    })
}

async fn sweep(store: &Store, registry: &SessionRegistry, heartbeat_timeout: Duration) {
    for username in store.stale_online_users(heartbeat_timeout) {
        if let Some(writer) = registry.control_writer(&username) {
            let mut w = writer.lock().await;
            let _ = tokio::io::AsyncWriteExt::shutdown(&mut *w).await;
        }
        registry.set_offline(&username);
        store.set_offline(&username);
        tracing::info!(user = %username, "presence monitor reaped stale session");
    }
}
