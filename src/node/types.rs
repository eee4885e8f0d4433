//! Wire types for the gossip node's HTTP control surface.
//!
//! The node speaks Go-style PascalCase JSON. These types rename fields into
//! Rust conventions and tolerate the older shapes some node revisions still
//! return (plain-string routes, private messages without `SeqID`/`Hash`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the node learned about a peer. Sent on the wire as `Type: 0 | 1 | 2`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum PeerKind {
    /// Added by the operator (CLI flag or `POST /node`).
    Manual,
    /// Learned from an incoming packet.
    Learned,
    /// Added by NAT traversal short-circuiting.
    ShortCircuited,
}

impl PeerKind {
    pub fn label(self) -> &'static str {
        match self {
            PeerKind::Manual => "manual",
            PeerKind::Learned => "learned",
            PeerKind::ShortCircuited => "short-circuited",
        }
    }
}

impl TryFrom<u8> for PeerKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PeerKind::Manual),
            1 => Ok(PeerKind::Learned),
            2 => Ok(PeerKind::ShortCircuited),
            other => Err(format!("unknown peer type {other}")),
        }
    }
}

impl From<PeerKind> for u8 {
    fn from(kind: PeerKind) -> u8 {
        match kind {
            PeerKind::Manual => 0,
            PeerKind::Learned => 1,
            PeerKind::ShortCircuited => 2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Type")]
    pub kind: PeerKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    #[serde(rename = "FromNode")]
    pub from_node: String,
    #[serde(rename = "FromAddress", default)]
    pub from_address: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "SeqID", default)]
    pub seq_id: u32,
    #[serde(rename = "FirstSeen", default)]
    pub first_seen: String,
    #[serde(rename = "Hash", default)]
    pub hash: String,
}

/// A known origin and the neighbour that routes to it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    #[serde(rename = "Origin")]
    pub origin: String,
    /// Empty when the node only reports origins.
    #[serde(rename = "Address")]
    pub next_hop_address: String,
}

impl<'de> Deserialize<'de> for RouteRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Older nodes return `["alice", "bob"]` instead of route objects.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireRoute {
            Full {
                #[serde(rename = "Origin")]
                origin: String,
                #[serde(rename = "Address", default)]
                address: String,
            },
            OriginOnly(String),
        }

        Ok(match WireRoute::deserialize(deserializer)? {
            WireRoute::Full { origin, address } => RouteRecord {
                origin,
                next_hop_address: address,
            },
            WireRoute::OriginOnly(origin) => RouteRecord {
                origin,
                next_hop_address: String::new(),
            },
        })
    }
}

/// The joint result of one synchronization tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub identity: String,
    pub peers: Vec<PeerRecord>,
    pub messages: Vec<MessageRecord>,
    pub routes: Vec<RouteRecord>,
}

/// Body of `POST /privateMessage`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OutgoingPrivateMessage {
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Content")]
    pub content: String,
}

/// Body of `POST /search`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchQuery {
    #[serde(rename = "Keywords")]
    pub keywords: String,
    /// Zero lets the node grow the budget on its own.
    #[serde(rename = "Budget")]
    pub budget: u32,
}

/// A file download as submitted to `POST /download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub name: String,
    pub hash: String,
    /// Empty means "any peer that advertises it".
    pub peer: String,
}

impl fmt::Display for DownloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.peer.is_empty() {
            write!(f, "{} ({})", self.name, self.hash)
        } else {
            write!(f, "{} ({}) from {}", self.name, self.hash, self.peer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_list_parses_all_kinds() {
        let json = r#"[
            {"Address": "127.0.0.1:5000", "Type": 0},
            {"Address": "127.0.0.1:5001", "Type": 1},
            {"Address": "127.0.0.1:5002", "Type": 2}
        ]"#;
        let peers: Vec<PeerRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(peers[0].kind, PeerKind::Manual);
        assert_eq!(peers[1].kind, PeerKind::Learned);
        assert_eq!(peers[2].kind, PeerKind::ShortCircuited);
        assert_eq!(peers[2].kind.label(), "short-circuited");
    }

    #[test]
    fn test_unknown_peer_type_is_rejected() {
        let json = r#"[{"Address": "127.0.0.1:5000", "Type": 7}]"#;
        assert!(serde_json::from_str::<Vec<PeerRecord>>(json).is_err());
    }

    #[test]
    fn test_routes_accept_objects_and_plain_strings() {
        let full: Vec<RouteRecord> =
            serde_json::from_str(r#"[{"Origin": "alice", "Address": "10.0.0.1:5000"}]"#).unwrap();
        assert_eq!(full[0].origin, "alice");
        assert_eq!(full[0].next_hop_address, "10.0.0.1:5000");

        let plain: Vec<RouteRecord> = serde_json::from_str(r#"["bob", "carol"]"#).unwrap();
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[1].origin, "carol");
        assert!(plain[1].next_hop_address.is_empty());
    }

    #[test]
    fn test_private_message_without_seq_and_hash() {
        let json = r#"[{
            "FirstSeen": "2018-11-02T10:00:00Z",
            "FromNode": "bob",
            "FromAddress": "127.0.0.1:5001",
            "Content": "hi"
        }]"#;
        let messages: Vec<MessageRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(messages[0].seq_id, 0);
        assert!(messages[0].hash.is_empty());
    }

    #[test]
    fn test_outgoing_bodies_use_node_field_names() {
        let body = serde_json::to_value(OutgoingPrivateMessage {
            destination: "bob".into(),
            content: "hello".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"Destination": "bob", "Content": "hello"}));

        let query = serde_json::to_value(SearchQuery {
            keywords: "report,pdf".into(),
            budget: 4,
        })
        .unwrap();
        assert_eq!(query, serde_json::json!({"Keywords": "report,pdf", "Budget": 4}));
    }

    #[test]
    fn test_download_request_display() {
        let any = DownloadRequest {
            name: "a.txt".into(),
            hash: "ff".into(),
            peer: String::new(),
        };
        assert_eq!(any.to_string(), "a.txt (ff)");
        let pinned = DownloadRequest {
            peer: "bob".into(),
            ..any
        };
        assert_eq!(pinned.to_string(), "a.txt (ff) from bob");
    }
}
