//! Shared fixtures: a recording transport and tiny in-process servers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use command_console::error::{ConsoleError, Result};
use command_console::protocol::{CommandResult, StatsSnapshot};
use command_console::transport::{Dispatch, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Recording transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Reply {
    /// Behave like the realtime channel: hand back a pending id.
    Pending,
    Completed(CommandResult),
    Fail,
}

#[derive(Clone)]
pub struct MockTransport {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub stats_calls: Arc<Mutex<usize>>,
    pub closed: Arc<Mutex<bool>>,
    reply: Reply,
    stats: Option<StatsSnapshot>,
    connected: bool,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(reply: Reply) -> Self {
        MockTransport {
            calls: Arc::new(Mutex::new(Vec::new())),
            stats_calls: Arc::new(Mutex::new(0)),
            closed: Arc::new(Mutex::new(false)),
            reply,
            stats: None,
            connected: false,
            delay: None,
        }
    }

    pub fn connected(mut self) -> Self {
        self.connected = true;
        self
    }

    pub fn with_stats(mut self, stats: StatsSnapshot) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Hold every dispatch for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn dispatch(&self, command: &str) -> Result<Dispatch> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(command.to_string());
            calls.len()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Pending => Ok(Dispatch::Pending {
                request_id: format!("req-{n}"),
            }),
            Reply::Completed(result) => Ok(Dispatch::Completed(result.clone())),
            Reply::Fail => Err(ConsoleError::Connect {
                url: "http://127.0.0.1:1/api/execute".into(),
                detail: "connection refused".into(),
            }),
        }
    }

    async fn load_stats(&self) -> Result<StatsSnapshot> {
        *self.stats_calls.lock().unwrap() += 1;
        self.stats.clone().ok_or(ConsoleError::Http {
            status: 404,
            url: "http://127.0.0.1:1/api/stats".into(),
        })
    }

    async fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

// ---------------------------------------------------------------------------
// HTTP fixture
// ---------------------------------------------------------------------------

/// A recorded request: `"POST /api/execute"` plus its body.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub line: String,
    pub body: String,
}

/// Serve one canned `(status, body)` per connection, in order, then stop.
/// Returns the base URL and a handle yielding the requests seen.
pub async fn serve_http(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<SeenRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);

            let reason = match status {
                200 => "OK",
                400 => "Bad Request",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        seen
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> SeenRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.eq_ignore_ascii_case("content-length")
                .then(|| v.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let line = head.lines().next().unwrap_or("").to_string();
    let line = line.rsplit_once(' ').map(|(l, _)| l.to_string()).unwrap_or(line);
    SeenRequest {
        line,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
