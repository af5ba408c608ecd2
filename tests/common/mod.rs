//! Shared fixtures for integration tests: a local origin server and a proxy
//! wired to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cache_proxy::cache::EvictionPolicy;
use cache_proxy::{Config, ProxyServer, ResponseCache};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const ORIGIN_RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\nServer: mock-origin\r\n\r\n";

/// Origin that answers every request with `ORIGIN_RESPONSE` and counts
/// connections.
pub struct MockOrigin {
    pub addr: SocketAddr,
    pub connections: Arc<AtomicUsize>,
    pub requests: Arc<tokio::sync::Mutex<Vec<Vec<u8>>>>,
}

impl MockOrigin {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let counter = connections.clone();
        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let seen = seen.clone();
                tokio::spawn(async move {
                    let request = read_headers(&mut socket).await;
                    seen.lock().await.push(request);
                    let _ = socket.write_all(ORIGIN_RESPONSE).await;
                });
            }
        });

        Self {
            addr,
            connections,
            requests,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// A proxy running in the background, stopped on drop of `stop`.
pub struct RunningProxy {
    pub port: u16,
    pub cache: ResponseCache,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningProxy {
    pub async fn start(origin: &MockOrigin, capacity: usize) -> Self {
        let config = Config {
            listen_port: 0,
            origin_port: origin.addr.port(),
            cache_capacity: capacity,
            eviction_policy: EvictionPolicy::Lru,
            read_timeout_secs: 5,
            connect_timeout_secs: 5,
            ..Config::default()
        };
        let cache = ResponseCache::from_config(&config);
        let server = ProxyServer::bind(&config, cache.clone()).unwrap();
        let port = server.local_addr().unwrap().port();

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        Self {
            port,
            cache,
            stop: Some(stop),
            task,
        }
    }

    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = (&mut self.task).await;
    }
}

/// Connects to the proxy, sends `request`, half-closes and reads the reply.
pub async fn send_through_proxy(port: u16, request: &[u8]) -> Vec<u8> {
    let mut client = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    received
}

/// Request for `path` on the mock origin, addressed the way a browser
/// configured with a proxy would.
pub fn proxy_request(path: &str) -> Vec<u8> {
    format!(
        "GET http://127.0.0.1{} HTTP/1.0\r\nHost: 127.0.0.1\r\nUser-Agent: integration\r\n\r\n",
        path
    )
    .into_bytes()
}

async fn read_headers(socket: &mut TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                request.extend_from_slice(&buf[..n]);
                if request.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    request
}
