//! Environment-derived server configuration.

use std::net::IpAddr;

/// Runtime configuration for both listeners, the store path, and presence timing.
///
/// Mirrors `server/config.py` from the original implementation: every field
/// has an `RCORD_`-prefixed env var and a hardcoded default, read once at
/// startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub media_port: u16,
    pub db_path: String,
    pub heartbeat_timeout_secs: u64,
    pub check_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8765,
            media_port: 8766,
            db_path: "DB.dat".to_string(),
            heartbeat_timeout_secs: 60,
            check_interval_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Read configuration from `RCORD_*` environment variables, falling back
    /// to the defaults in [`ServerConfig::default`] for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let defaults = ServerConfig::default();

        let host = std::env::var("RCORD_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.host);

        let port = std::env::var("RCORD_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let media_port = std::env::var("RCORD_MEDIA_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(port + 1);

        let db_path = std::env::var("RCORD_DB_PATH").unwrap_or(defaults.db_path);

        let heartbeat_timeout_secs = std::env::var("RCORD_HEARTBEAT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.heartbeat_timeout_secs);

        let check_interval_secs = std::env::var("RCORD_CHECK_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.check_interval_secs);

        ServerConfig {
            host,
            port,
            media_port,
            db_path,
            heartbeat_timeout_secs,
            check_interval_secs,
        }
    }
}
