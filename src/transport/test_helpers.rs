use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::types::{AIMessage, ServiceStatus, StatusSnapshot, TransportError};
use super::Transport;

/// Scripted transport: replies are handed out in order, prompts are recorded.
pub struct MockTransport {
    replies: Mutex<Vec<Result<AIMessage, TransportError>>>,
    status: Mutex<Option<Result<StatusSnapshot, TransportError>>>,
    prompts: Mutex<Vec<String>>,
    status_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new(replies: Vec<Result<AIMessage, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            status: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_status(self, status: Result<StatusSnapshot, TransportError>) -> Self {
        *self.status.lock().expect("mock mutex should lock") = Some(status);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock mutex should lock").clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

pub fn reply(content: &str, model: &str, finish_reason: Option<&str>) -> AIMessage {
    AIMessage {
        content: content.into(),
        model: model.into(),
        finish_reason: finish_reason.map(Into::into),
    }
}

pub fn online_snapshot() -> StatusSnapshot {
    StatusSnapshot::stamped_now(ServiceStatus { message: "Worker online".into(), model: Some("m1".into()) })
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .expect("mock mutex should lock")
            .take()
            .unwrap_or_else(|| Ok(online_snapshot()))
    }

    async fn generate(&self, message: &str) -> Result<AIMessage, TransportError> {
        self.prompts.lock().expect("mock mutex should lock").push(message.to_string());
        let mut replies = self.replies.lock().expect("mock mutex should lock");
        if replies.is_empty() {
            Ok(reply("done", "mock", Some("stop")))
        } else {
            replies.remove(0)
        }
    }
}

/// What the stub server saw.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Client that ignores proxy environment variables so requests reach the stub.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client should build")
}

/// Accept one HTTP/1.1 connection, answer with `status`/`body`, return the request.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("stub should bind");
    let addr = listener.local_addr().expect("stub should have an address");
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("stub should accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.expect("stub should read");
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        let content_length = headers
            .iter()
            .find(|(key, _)| key == "content-length")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.expect("stub should read body");
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

        let response = if status == 204 {
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
        } else {
            format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        };
        socket.write_all(response.as_bytes()).await.expect("stub should write");
        let _ = socket.shutdown().await;

        CapturedRequest { request_line, headers, body: request_body }
    });

    (format!("http://{addr}"), handle)
}
