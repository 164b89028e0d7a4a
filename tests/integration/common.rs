use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rcord::session::SessionRegistry;
use rcord::store::Store;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A unique temp store path; deleted (alongside its `.tmp` sibling) on drop.
/// Mirrors the teacher's `TestClient::drop` temp-file cleanup convention.
pub struct TempStorePath(pub PathBuf);

impl Drop for TempStorePath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
        let mut tmp = self.0.clone().into_os_string();
        tmp.push(".tmp");
        let _ = std::fs::remove_file(tmp);
    }
}

pub fn temp_store_path() -> TempStorePath {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    TempStorePath(std::env::temp_dir().join(format!(
        "rcord_integration_{}_{}.dat",
        std::process::id(),
        n
    )))
}

/// A running control + media gateway pair over a freshly opened store,
/// bound to ephemeral ports on loopback.
pub struct TestServer {
    pub control_addr: std::net::SocketAddr,
    pub media_addr: std::net::SocketAddr,
    pub store: Arc<Store>,
    pub registry: Arc<SessionRegistry>,
    _path: TempStorePath,
}

impl TestServer {
    pub async fn start() -> TestServer {
        TestServer::start_with_seed(None).await
    }

    /// Starts a server whose store file is pre-seeded with `seed` (a bare,
    /// unwrapped `data` object) before the store is opened — useful for
    /// constructing already-expired invites without waiting out the real
    /// 300-second TTL.
    pub async fn start_with_seed(seed: Option<Value>) -> TestServer {
        let path = temp_store_path();
        if let Some(seed) = seed {
            std::fs::write(&path.0, serde_json::to_vec(&seed).unwrap()).unwrap();
        }
        let store = Arc::new(Store::open(&path.0).unwrap());
        let registry = Arc::new(SessionRegistry::new());

        let control_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let control_addr = control_listener.local_addr().unwrap();
        let media_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let media_addr = media_listener.local_addr().unwrap();

        tokio::spawn(rcord::gateway::control::serve(
            control_listener,
            store.clone(),
            registry.clone(),
        ));
        tokio::spawn(rcord::gateway::media::serve(
            media_listener,
            store.clone(),
            registry.clone(),
        ));

        TestServer {
            control_addr,
            media_addr,
            store,
            registry,
            _path: path,
        }
    }

    pub async fn connect_control(&self) -> TestConn {
        TestConn::connect(self.control_addr).await
    }

    pub async fn connect_media(&self) -> TestConn {
        TestConn::connect(self.media_addr).await
    }
}

/// A connected socket plus line-oriented send/recv helpers speaking the
/// newline-delimited JSON wire protocol directly, the analogue of the
/// teacher's `rocket::local::blocking::Client` once there's no HTTP client
/// fixture to lean on.
pub struct TestConn {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl TestConn {
    pub async fn connect(addr: std::net::SocketAddr) -> TestConn {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        TestConn {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Writes a raw line (not necessarily valid JSON) terminated by `\n`.
    pub async fn writer_raw_line(&mut self, raw: &str) {
        self.writer.write_all(raw.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    pub async fn send(&mut self, value: Value) {
        let mut line = serde_json::to_vec(&value).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    pub async fn recv(&mut self) -> Value {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "connection closed before a response arrived");
        serde_json::from_str(line.trim_end()).unwrap()
    }

    pub async fn register_and_login(&mut self, username: &str, password: &str) -> Value {
        self.send(json!({"action": "register", "username": username, "password": password}))
            .await;
        self.recv().await;
        self.send(json!({"action": "login", "username": username, "password": password}))
            .await;
        self.recv().await
    }
}
