//! One-shot local HTTP server for exercising the Gemini client end to end.

use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::client::GeminiClient;

/// The request the server received.
pub(crate) struct CapturedRequest {
    /// e.g. `POST /v1beta/models/m:generateContent HTTP/1.1`
    pub request_line: String,
    /// Header block, lowercased.
    pub headers: String,
    pub body: String,
}

/// Answer exactly one request with a canned response.
///
/// Returns the base URL to point a client at and a handle that yields the
/// captured request once it has been answered.
pub(crate) async fn serve_once(
    status: &str,
    content_type: &str,
    body: &str,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{addr}/v1beta"), handle)
}

/// A client for `base_url` that never goes through a system proxy.
pub(crate) fn local_client(base_url: &str) -> GeminiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiClient::with_http(http, SecretString::from("test-key".to_string()), base_url)
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the request was complete");
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = head_end + 4;
        if buf.len() < body_start + body_len {
            continue;
        }

        let raw_head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let (request_line, _) = raw_head.split_once("\r\n").unwrap_or((raw_head.as_str(), ""));
        return CapturedRequest {
            request_line: request_line.to_string(),
            headers: head,
            body: String::from_utf8_lossy(&buf[body_start..body_start + body_len]).to_string(),
        };
    }
}
