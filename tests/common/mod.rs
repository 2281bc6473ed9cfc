//! Common test utilities for onyesha integration tests
//!
//! The server lifecycle is a library API, so tests run the server in-process
//! instead of spawning the binary.

#![allow(dead_code)] // Test utilities are shared across integration test binaries

use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::OnceLock;

use tempfile::TempDir;

use onyesha::config::ServerConfig;
use onyesha::network::NetworkUtils;
use onyesha::server::{ServerHandle, ServerLifecycle};

/// Port counter to avoid conflicts in parallel tests. Seeded from the
/// process id so concurrently running test binaries use disjoint ranges.
static PORT_COUNTER: OnceLock<AtomicU16> = OnceLock::new();

fn port_counter() -> &'static AtomicU16 {
    PORT_COUNTER.get_or_init(|| AtomicU16::new(3100 + (std::process::id() % 4096) as u16))
}

/// Claim a port that is currently free.
pub fn reserve_port() -> u16 {
    loop {
        let port = port_counter().fetch_add(1, Ordering::SeqCst);
        if port > 1024 && NetworkUtils::is_port_available("127.0.0.1", port) {
            return port;
        }
    }
}

/// In-process test server with its own temporary document root.
pub struct TestServer {
    pub lifecycle: ServerLifecycle,
    pub handle: ServerHandle,
    pub port: u16,
    pub base_url: String,
    pub temp_dir: TempDir,
}

impl TestServer {
    /// Start a server on a free port, serving a fresh temporary directory.
    pub fn start() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self::start_with_root(temp_dir, &root)
    }

    /// Start a server serving `root`, which must live inside `temp_dir`
    /// (or be it).
    pub fn start_with_root(temp_dir: TempDir, root: &Path) -> Self {
        let port = reserve_port();
        let config = ServerConfig::new("127.0.0.1", port, root)
            .expect("Failed to build server config");
        let lifecycle = ServerLifecycle::new(config);
        let handle = lifecycle.start().expect("Failed to start test server");

        TestServer {
            lifecycle,
            handle,
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            temp_dir,
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        format!("{}{}", self.base_url, path)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Send a GET request over a raw socket and return the full response text.
///
/// HTTP clients normalize dot segments out of the URL before sending, so
/// traversal attempts have to be written to the wire by hand.
pub async fn raw_get(addr: &str, path: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect failed");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream
        .write_all(request.as_bytes())
        .await
        .expect("request write failed");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .await
        .expect("response read failed");
    String::from_utf8_lossy(&response).into_owned()
}

/// Write the basic site files most tests expect into `root`.
pub fn setup_basic_site(root: &Path) {
    std::fs::write(
        root.join("index.html"),
        "<!DOCTYPE html>\n<html><head><title>Test Site</title></head>\n<body><h1>Welcome</h1></body></html>\n",
    )
    .expect("Failed to write index.html");

    std::fs::write(
        root.join("style.css"),
        "body { background-color: #fafafa; }\n",
    )
    .expect("Failed to write style.css");

    std::fs::write(root.join("main.js"), "console.log('ready');\n").expect("Failed to write main.js");

    std::fs::write(root.join("data.json"), r#"{"name": "test", "value": 42}"#)
        .expect("Failed to write data.json");
}
