//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::node::{
    DownloadRequest, MessageRecord, NodeClient, NodeError, OutgoingPrivateMessage, PeerKind,
    PeerRecord, RouteRecord, SearchQuery, Snapshot,
};

/// A node that knows nothing and accepts everything.
pub struct NoopNodeClient;

#[async_trait]
impl NodeClient for NoopNodeClient {
    fn base_url(&self) -> &str {
        "http://noop.invalid"
    }

    async fn identity(&self) -> Result<String, NodeError> {
        Ok("noop".to_string())
    }

    async fn peers(&self) -> Result<Vec<PeerRecord>, NodeError> {
        Ok(Vec::new())
    }

    async fn messages(&self) -> Result<Vec<MessageRecord>, NodeError> {
        Ok(Vec::new())
    }

    async fn routes(&self) -> Result<Vec<RouteRecord>, NodeError> {
        Ok(Vec::new())
    }

    async fn private_messages(&self, _peer: &str) -> Result<Vec<MessageRecord>, NodeError> {
        Ok(Vec::new())
    }

    async fn broadcast(&self, _content: &str) -> Result<(), NodeError> {
        Ok(())
    }

    async fn send_private(&self, _message: &OutgoingPrivateMessage) -> Result<(), NodeError> {
        Ok(())
    }

    async fn toggle_peer(&self, _address: &str) -> Result<(), NodeError> {
        Ok(())
    }

    async fn rename(&self, _name: &str) -> Result<(), NodeError> {
        Ok(())
    }

    async fn search(&self, _query: &SearchQuery, _sender: Sender<String>) -> Result<(), NodeError> {
        Ok(())
    }

    async fn download(&self, _request: &DownloadRequest) -> Result<Vec<u8>, NodeError> {
        Ok(Vec::new())
    }

    async fn upload(&self, _file_name: &str, _contents: Vec<u8>) -> Result<String, NodeError> {
        Ok(String::new())
    }
}

/// Creates a test App backed by a NoopNodeClient and default settings.
pub fn test_app() -> App {
    let config = crate::core::config::resolve_with_env(
        &Default::default(),
        &Default::default(),
        |_| None,
    );
    test_app_with(config)
}

pub fn test_app_with(config: ResolvedConfig) -> App {
    App::from_config(Arc::new(NoopNodeClient), &config)
}

pub fn message(from: &str, content: &str, seq_id: u32) -> MessageRecord {
    MessageRecord {
        from_node: from.to_string(),
        from_address: "127.0.0.1:5000".to_string(),
        content: content.to_string(),
        seq_id,
        first_seen: "2018-11-02T10:00:00Z".to_string(),
        hash: String::new(),
    }
}

pub fn peer(address: &str, kind: PeerKind) -> PeerRecord {
    PeerRecord {
        address: address.to_string(),
        kind,
    }
}

pub fn route(origin: &str, next_hop: &str) -> RouteRecord {
    RouteRecord {
        origin: origin.to_string(),
        next_hop_address: next_hop.to_string(),
    }
}

/// A snapshot with one of everything.
pub fn snapshot(identity: &str) -> Snapshot {
    Snapshot {
        identity: identity.to_string(),
        peers: vec![peer("127.0.0.1:5001", PeerKind::Manual)],
        messages: vec![message("alice", "hello", 0)],
        routes: vec![route("alice", "127.0.0.1:5001")],
    }
}
