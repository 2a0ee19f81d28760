//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relay_server::config::RelayConfig;
use relay_server::registry::ServiceRegistry;
use relay_server::relay::handler::client_builder;
use relay_server::relay::Relayer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock upstream answers with.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self::with_type(status, "application/json", body)
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::with_type(status, "text/plain", body)
    }

    /// Raw body bytes under an explicit content type.
    pub fn bytes(status: u16, content_type: &str, body: &[u8]) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.to_vec(),
            delay: Duration::ZERO,
        }
    }

    fn with_type(status: u16, content_type: &str, body: &str) -> Self {
        Self::bytes(status, content_type, body.as_bytes())
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Requests fully received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("upstream received no request")
    }
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_upstream<F>(respond: F) -> MockUpstream
where
    F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let task_hits = hits.clone();
    let task_requests = requests.clone();
    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            task_hits.fetch_add(1, Ordering::SeqCst);
            let respond = respond.clone();
            let requests = task_requests.clone();
            tokio::spawn(async move {
                handle_connection(socket, respond.as_ref(), requests).await;
            });
        }
    });

    MockUpstream {
        addr,
        hits,
        requests,
    }
}

/// Start a mock upstream that always gives the same answer.
pub async fn start_fixed_upstream(response: MockResponse) -> MockUpstream {
    start_upstream(move |_| response.clone()).await
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A relayer for `config`'s services that ignores proxy environment variables.
pub fn relayer_for(config: &RelayConfig) -> Relayer {
    let registry = Arc::new(ServiceRegistry::new(config.services.0.clone()));
    let client = client_builder().no_proxy().build().unwrap();
    Relayer::with_client(registry, client)
}

/// Default config with the given services.
pub fn config_with(services: &[(&str, String)]) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.services.0 = services
        .iter()
        .map(|(name, url)| (name.to_string(), url.clone()))
        .collect::<BTreeMap<_, _>>();
    config
}

async fn handle_connection<F>(
    mut socket: TcpStream,
    respond: &F,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) where
    F: Fn(&RecordedRequest) -> MockResponse,
{
    let request = match read_request(&mut socket).await {
        Some(request) => request,
        None => return,
    };
    requests.lock().unwrap().push(request.clone());

    let response = respond(&request);
    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let mut raw = format!("HTTP/1.1 {} Mock\r\n", response.status);
    for (name, value) in &response.headers {
        raw.push_str(&format!("{}: {}\r\n", name, value));
    }
    raw.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.body.len()
    ));
    let mut raw = raw.into_bytes();
    raw.extend_from_slice(&response.body);
    let _ = socket.write_all(&raw).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
