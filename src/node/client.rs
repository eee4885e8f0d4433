//! HTTP client for the gossip node's control surface.
//!
//! `NodeClient` is the seam between the panel and the node: the TUI only ever
//! holds an `Arc<dyn NodeClient>`, tests swap in a no-op implementation, and
//! `HttpNodeClient` is the real thing talking to `GET/POST` endpoints on the
//! node's local web server.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::Sender;

use super::types::{
    DownloadRequest, MessageRecord, OutgoingPrivateMessage, PeerRecord, RouteRecord, SearchQuery,
    Snapshot,
};

/// Errors that can occur while talking to the node.
#[derive(Debug)]
pub enum NodeError {
    /// Connection refused, DNS failure, reset mid-body.
    Network(String),
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// The node answered with a non-2xx status.
    Api { status: u16, message: String },
    /// The body was not the JSON shape we expected.
    Parse(String),
    /// Local file I/O around downloads and uploads.
    Io(String),
    /// The receiving side of a stream was dropped.
    ChannelClosed,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Network(msg) => write!(f, "network error: {msg}"),
            NodeError::Timeout(msg) => write!(f, "timed out: {msg}"),
            NodeError::Api { status, message } if message.is_empty() => {
                write!(f, "node error (HTTP {status})")
            }
            NodeError::Api { status, message } => {
                write!(f, "node error (HTTP {status}): {message}")
            }
            NodeError::Parse(msg) => write!(f, "malformed payload: {msg}"),
            NodeError::Io(msg) => write!(f, "I/O error: {msg}"),
            NodeError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<reqwest::Error> for NodeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NodeError::Timeout(e.to_string())
        } else if e.is_decode() {
            NodeError::Parse(e.to_string())
        } else {
            NodeError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for NodeError {
    fn from(e: std::io::Error) -> Self {
        NodeError::Io(e.to_string())
    }
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Base URL of the node's web server, for display and logging.
    fn base_url(&self) -> &str;

    /// `GET /id`: the node's display name.
    async fn identity(&self) -> Result<String, NodeError>;

    /// `GET /node`: the current peer set.
    async fn peers(&self) -> Result<Vec<PeerRecord>, NodeError>;

    /// `GET /message`: the public gossip feed.
    async fn messages(&self) -> Result<Vec<MessageRecord>, NodeError>;

    /// `GET /routes`: known origins and their next hop.
    async fn routes(&self) -> Result<Vec<RouteRecord>, NodeError>;

    /// `GET /privateMessage?name=<peer>`: the private feed with one peer.
    async fn private_messages(&self, peer: &str) -> Result<Vec<MessageRecord>, NodeError>;

    /// Fetches the four snapshot resources concurrently.
    ///
    /// All four must succeed; the first failure fails the whole snapshot and
    /// the other results are dropped.
    async fn snapshot(&self) -> Result<Snapshot, NodeError> {
        let (identity, peers, messages, routes) = futures::try_join!(
            self.identity(),
            self.peers(),
            self.messages(),
            self.routes()
        )?;
        Ok(Snapshot {
            identity,
            peers,
            messages,
            routes,
        })
    }

    /// `POST /message`: broadcast a gossip message.
    async fn broadcast(&self, content: &str) -> Result<(), NodeError>;

    /// `POST /privateMessage`: send a private message.
    async fn send_private(&self, message: &OutgoingPrivateMessage) -> Result<(), NodeError>;

    /// `POST /node`: adds the address, or removes it if it is already a peer.
    async fn toggle_peer(&self, address: &str) -> Result<(), NodeError>;

    /// `POST /id`: rename the local node.
    async fn rename(&self, name: &str) -> Result<(), NodeError>;

    /// `POST /search`: streams the decoded response body to `sender` as it
    /// arrives. Returns once the node closes the stream.
    async fn search(&self, query: &SearchQuery, sender: Sender<String>) -> Result<(), NodeError>;

    /// `POST /download`: returns the file contents.
    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>, NodeError>;

    /// `POST /upload`: shares a file, returning the node's status text.
    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<String, NodeError>;
}

/// Talks to a node over plain HTTP.
pub struct HttpNodeClient {
    base_url: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl HttpNodeClient {
    /// `request_timeout` bounds every request except the search stream, which
    /// may legitimately stay open for as long as the node keeps searching.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build configured HTTP client ({e}), using defaults");
                reqwest::Client::new()
            });
        Self {
            base_url,
            request_timeout,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NodeError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NodeError::Parse(format!("{path}: {e}")))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), NodeError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into `NodeError::Api`, keeping the body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, NodeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default().trim().to_string();
    warn!("Node returned HTTP {}: {}", status.as_u16(), message);
    Err(NodeError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn identity(&self) -> Result<String, NodeError> {
        self.get_json("/id").await
    }

    async fn peers(&self) -> Result<Vec<PeerRecord>, NodeError> {
        self.get_json("/node").await
    }

    async fn messages(&self) -> Result<Vec<MessageRecord>, NodeError> {
        self.get_json("/message").await
    }

    async fn routes(&self) -> Result<Vec<RouteRecord>, NodeError> {
        self.get_json("/routes").await
    }

    async fn private_messages(&self, peer: &str) -> Result<Vec<MessageRecord>, NodeError> {
        let url = self.url("/privateMessage");
        debug!("GET {} name={}", url, peer);
        let response = self
            .client
            .get(&url)
            .query(&[("name", peer)])
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| NodeError::Parse(format!("/privateMessage: {e}")))
    }

    async fn broadcast(&self, content: &str) -> Result<(), NodeError> {
        info!("Broadcasting gossip message ({} bytes)", content.len());
        self.post_json("/message", content).await
    }

    async fn send_private(&self, message: &OutgoingPrivateMessage) -> Result<(), NodeError> {
        info!("Sending private message to {}", message.destination);
        self.post_json("/privateMessage", message).await
    }

    async fn toggle_peer(&self, address: &str) -> Result<(), NodeError> {
        info!("Toggling peer {}", address);
        self.post_json("/node", address).await
    }

    async fn rename(&self, name: &str) -> Result<(), NodeError> {
        info!("Renaming node to {}", name);
        self.post_json("/id", name).await
    }

    async fn search(&self, query: &SearchQuery, sender: Sender<String>) -> Result<(), NodeError> {
        let url = self.url("/search");
        info!(
            "Search request: keywords={:?}, budget={}",
            query.keywords, query.budget
        );

        // No overall timeout: results trickle in for as long as the budget grows.
        let response = self.client.post(&url).json(query).send().await?;
        let mut response = ensure_success(response).await?;

        let mut carry = Utf8Carry::default();
        let mut total_bytes = 0usize;
        while let Some(chunk) = response.chunk().await? {
            total_bytes += chunk.len();
            debug!("Search chunk: {} bytes (total {})", chunk.len(), total_bytes);
            let text = carry.push(&chunk);
            if text.is_empty() {
                continue;
            }
            if sender.send(text).await.is_err() {
                warn!("Search chunk send failed: receiver dropped");
                return Err(NodeError::ChannelClosed);
            }
        }

        let rest = carry.finish();
        if !rest.is_empty() && sender.send(rest).await.is_err() {
            return Err(NodeError::ChannelClosed);
        }
        info!("Search stream ended after {} bytes", total_bytes);
        Ok(())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>, NodeError> {
        let url = self.url("/download");
        info!("Download request: {}", request);
        // Downloads can take a while to assemble chunks from remote peers.
        let response = self
            .client
            .post(&url)
            .form(&[
                ("fileName", request.name.as_str()),
                ("fileHash", request.hash.as_str()),
                ("filePeer", request.peer.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<String, NodeError> {
        let url = self.url("/upload");
        info!("Uploading {} ({} bytes)", file_name, contents.len());
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("uploadedFile", part);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.text().await?.trim().to_string())
    }
}

/// Decodes a byte stream as UTF-8 without mangling characters that straddle
/// two network chunks. Incomplete trailing sequences are held back until the
/// next chunk completes them.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let out = text.to_string();
                self.pending.clear();
                out
            }
            // Truncated sequence at the end: emit the valid prefix, keep the tail.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                out
            }
            Err(_) => {
                let out = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                out
            }
        }
    }

    /// Flushes whatever is left; an unfinished sequence becomes U+FFFD.
    pub fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carry_passes_ascii_through() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(b"hello\n"), "hello\n");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn test_carry_holds_split_multibyte_char() {
        let bytes = "café\n".as_bytes();
        // 'é' is two bytes; split between them
        let split = bytes.len() - 2;
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(&bytes[..split]), "caf");
        assert_eq!(carry.push(&bytes[split..]), "é\n");
        assert_eq!(carry.finish(), "");
    }

    #[test]
    fn test_carry_replaces_invalid_bytes() {
        let mut carry = Utf8Carry::default();
        let out = carry.push(&[b'a', 0xff, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_carry_finish_flushes_truncated_tail() {
        let mut carry = Utf8Carry::default();
        assert_eq!(carry.push(&[0xc3]), "");
        assert_eq!(carry.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_api_error_display() {
        let err = NodeError::Api {
            status: 404,
            message: "File not found".into(),
        };
        assert_eq!(err.to_string(), "node error (HTTP 404): File not found");
        let bare = NodeError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(bare.to_string(), "node error (HTTP 500)");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpNodeClient::new("http://127.0.0.1:8080/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
        assert_eq!(client.url("/id"), "http://127.0.0.1:8080/id");
    }
}
