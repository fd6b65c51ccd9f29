//! Shared fakes and mock servers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::header::HeaderMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use reddit_proxy::auth::{CredentialError, CredentialProvider, CredentialState};
use reddit_proxy::auth::credential::now_secs;
use reddit_proxy::cache::{CacheError, CacheResult, CacheStore, MemoryCache};
use reddit_proxy::proxy::{HandlerSettings, ProxyHandler};
use reddit_proxy::upstream::{Transport, TransportError, UpstreamResponse};

/// Transport returning a canned reply and counting calls.
pub struct FakeTransport {
    reply: Result<(StatusCode, String), String>,
    calls: AtomicUsize,
    last: Mutex<Option<(Url, HeaderMap)>>,
}

impl FakeTransport {
    pub fn ok(body: &str) -> Arc<Self> {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok((status, body.to_string())),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().map(|(u, _)| u.to_string())
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        self.last
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|(_, h)| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<UpstreamResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((url.clone(), headers.clone()));
        match &self.reply {
            Ok((status, body)) => Ok(UpstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            Err(message) => Err(TransportError(message.clone())),
        }
    }
}

/// Cache whose calls never complete, like a backend that accepts and then stalls.
#[derive(Default)]
pub struct StallingCache {
    pub calls: AtomicUsize,
}

impl StallingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for StallingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: String, _ttl_secs: u64) -> CacheResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Memory cache wrapper counting reads and writes, optionally failing them.
#[derive(Default)]
pub struct CountingCache {
    inner: MemoryCache,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl CountingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("connection refused".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("connection refused".into()));
        }
        self.inner.set(key, value, ttl_secs).await
    }
}

/// Credential provider with a scripted refresh outcome.
pub struct FakeProvider {
    refreshed_token: Option<String>,
    refreshes: AtomicUsize,
}

impl FakeProvider {
    /// Refreshes succeed with the given access token.
    pub fn refreshing_to(token: &str) -> Arc<Self> {
        Arc::new(Self {
            refreshed_token: Some(token.to_string()),
            refreshes: AtomicUsize::new(0),
        })
    }

    /// Refreshes always fail.
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            refreshed_token: None,
            refreshes: AtomicUsize::new(0),
        })
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    fn is_valid(&self, credential: &CredentialState) -> bool {
        credential.is_fresh(60)
    }

    async fn refresh(&self, credential: &CredentialState) -> Result<CredentialState, CredentialError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        match &self.refreshed_token {
            Some(token) => Ok(CredentialState {
                access_token: token.clone(),
                expires_at: now_secs() + 3600,
                refresh_token: credential.refresh_token.clone(),
            }),
            None => Err(CredentialError::Rejected {
                status: 400,
                body: "invalid_grant".into(),
            }),
        }
    }
}

pub fn valid_credential(token: &str) -> CredentialState {
    CredentialState {
        access_token: token.to_string(),
        expires_at: now_secs() + 3600,
        refresh_token: Some("refresh".into()),
    }
}

pub fn expired_credential(token: &str) -> CredentialState {
    CredentialState {
        access_token: token.to_string(),
        expires_at: now_secs().saturating_sub(10),
        refresh_token: Some("refresh".into()),
    }
}

pub fn handler<C: CacheStore + 'static>(
    transport: Arc<FakeTransport>,
    cache: Arc<C>,
    provider: Arc<FakeProvider>,
    public_fallback: bool,
) -> ProxyHandler {
    let settings = HandlerSettings {
        public_fallback,
        ..HandlerSettings::default()
    };
    ProxyHandler::new(settings, cache, provider, transport)
}

/// Start a programmable HTTP server on an ephemeral port.
///
/// The closure receives the raw request (head and body) and returns status and body.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(String) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request);
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read the request head and, when a Content-Length is given, its body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let content_length = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
