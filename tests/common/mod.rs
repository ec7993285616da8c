//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use host_router::config::RouterConfig;
use host_router::http::HttpServer;
use host_router::lifecycle::Shutdown;
use host_router::security::AuthGate;
use std::sync::Arc;

/// Start a mock upstream that answers every request with a JSON echo of
/// the request line, headers and body size it received.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(echo(socket));
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn echo(mut socket: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let mut headers = Map::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), json!(value.trim()));
        }
    }

    let content_length = headers
        .get("content-length")
        .and_then(Value::as_str)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }

    let payload = json!({
        "method": method,
        "target": target,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    })
    .to_string();

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at `upstream`, rooted at `example.com`, with bearer auth.
pub fn bearer_config(upstream: SocketAddr) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.tenancy.root_domain = "example.com".to_string();
    config.upstream.address = upstream.to_string();
    config.auth.mode = host_router::config::AuthMode::Bearer;
    config.auth.tokens = vec!["secret-token".to_string()];
    config
}

/// A running router and the handle that stops it.
pub struct TestRouter {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestRouter {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRouter {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_router(config: RouterConfig) -> TestRouter {
    let server = HttpServer::new(config).unwrap();
    serve(server).await
}

pub async fn start_router_with_gate(config: RouterConfig, gate: Arc<dyn AuthGate>) -> TestRouter {
    let server = HttpServer::with_gate(config, gate).unwrap();
    serve(server).await
}

async fn serve(server: HttpServer) -> TestRouter {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRouter { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
