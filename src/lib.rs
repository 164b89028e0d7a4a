pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use session::SessionRegistry;
pub use store::Store;

/// Starts both listeners and the Presence Monitor, running until a `SIGINT`
/// (or, on non-Unix, Ctrl-C) is observed. Mirrors the teacher's
/// `rocket()`/`build_rocket()` convenience-function convention: build the
/// shared state once, then wire it into every surface.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let store = Arc::new(
        Store::open(&config.db_path)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?,
    );
    let registry = Arc::new(SessionRegistry::new());

    let control_addr = (config.host, config.port);
    let media_addr = (config.host, config.media_port);
    let control_listener = TcpListener::bind(control_addr).await?;
    let media_listener = TcpListener::bind(media_addr).await?;
    tracing::info!(host = %control_addr.0, port = control_addr.1, "control gateway listening");
    tracing::info!(host = %media_addr.0, port = media_addr.1, "media gateway listening");

    let monitor = presence::spawn(
        store.clone(),
        registry.clone(),
        Duration::from_secs(config.check_interval_secs),
        Duration::from_secs(config.heartbeat_timeout_secs),
    );

    let control = tokio::spawn(gateway::control::serve(
        control_listener,
        store.clone(),
        registry.clone(),
    ));
    let media = tokio::spawn(gateway::media::serve(media_listener, store, registry));

    tokio::select! {
        res = control => { log_join("control gateway", res); }
        res = media => { log_join("media gateway", res); }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    monitor.abort();
    Ok(())
}

fn log_join(label: &str, res: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!(%label, error = %err, "gateway stopped with error"),
        Err(err) => tracing::error!(%label, error = %err, "gateway task panicked"),
    }
}
