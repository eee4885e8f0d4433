pub mod client;
pub mod files;
pub mod types;

pub use client::{HttpNodeClient, NodeClient, NodeError};
pub use types::{
    DownloadRequest, MessageRecord, OutgoingPrivateMessage, PeerKind, PeerRecord, RouteRecord,
    SearchQuery, Snapshot,
};
