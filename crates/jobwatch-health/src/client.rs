//! HTTP client shared by the prober and the alert dispatcher.
//!
//! A thin wrapper over `reqwest`: rustls TLS, up to [`MAX_REDIRECTS`]
//! redirects, and a per-request timeout that covers connect, redirects
//! and reading the whole body.

use std::time::Duration;

use bytes::Bytes;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::debug;

/// Redirects followed before a request fails.
pub const MAX_REDIRECTS: usize = 5;

const AGENT: &str = concat!("jobwatch/", env!("CARGO_PKG_VERSION"));

/// Errors produced by [`HttpClient`]. The `Display` text is what gets
/// recorded as a check's failure description.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Setup(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

impl HttpError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(timeout)
        } else {
            HttpError::Transport(describe(&err))
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .user_agent(AGENT)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpError::Setup(describe(&e)))?;
        Ok(Self { http })
    }

    /// GET `url`, bounded by `timeout`.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, HttpError> {
        let request = self.http.get(url).timeout(timeout);
        read(url, request, timeout).await
    }

    /// POST `payload` as JSON to `url`, bounded by `timeout`.
    pub async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        let request = self.http.post(url).json(payload).timeout(timeout);
        read(url, request, timeout).await
    }
}

async fn read(
    request_url: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<HttpResponse, HttpError> {
    let response = request
        .send()
        .await
        .map_err(|e| HttpError::from_reqwest(e, timeout))?;
    let status = response.status().as_u16();
    if response.url().as_str() != request_url {
        debug!(status, from = %request_url, to = %response.url(), "followed redirect");
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| HttpError::from_reqwest(e, timeout))?;
    Ok(HttpResponse { status, body })
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_server {
    //! Canned-response HTTP servers on loopback.

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Raw requests received by a test server, in arrival order.
    pub type RequestLog = Arc<Mutex<Vec<String>>>;

    /// Build a raw HTTP/1.1 response with a correct Content-Length.
    pub fn response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// A redirect to `location` with an empty body.
    pub fn redirect(status: &str, location: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
    }

    /// Serve `responses` in order, one per connection, repeating the last.
    pub async fn serve(responses: Vec<String>) -> (SocketAddr, RequestLog) {
        serve_replies(responses.into_iter().map(Some).collect()).await
    }

    /// Hang up on the first connection after reading its request, then
    /// answer every later connection with `response`.
    pub async fn serve_dropping_first(response: String) -> (SocketAddr, RequestLog) {
        serve_replies(vec![None, Some(response)]).await
    }

    /// One reply per connection, repeating the last; `None` closes the
    /// connection without answering.
    async fn serve_replies(replies: Vec<Option<String>>) -> (SocketAddr, RequestLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = RequestLog::default();
        let log = requests.clone();

        tokio::spawn(async move {
            let mut index = 0;
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let raw = read_request(&mut stream).await;
                log.lock().unwrap().push(raw);
                let reply = replies[index.min(replies.len() - 1)].clone();
                index += 1;
                if let Some(reply) = reply {
                    let _ = stream.write_all(reply.as_bytes()).await;
                }
                let _ = stream.shutdown().await;
            }
        });

        (addr, requests)
    }

    /// Read each request and never answer it.
    pub async fn serve_silent() -> (SocketAddr, RequestLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = RequestLog::default();
        let log = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let raw = read_request(&mut stream).await;
                    log.lock().unwrap().push(raw);
                    std::future::pending::<()>().await;
                    drop(stream);
                });
            }
        });

        (addr, requests)
    }

    /// An address on which nothing is listening.
    pub async fn closed_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
