//! # Renderers
//!
//! Pure mappings from snapshot records to display rows. No diffing: every
//! tick the target view is rebuilt from the latest records.

use std::collections::HashSet;

use chrono::DateTime;

use crate::node::{MessageRecord, PeerRecord, RouteRecord};

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRow {
    pub author: String,
    pub relay: String,
    pub seq_id: u32,
    pub date: String,
    pub content: String,
    pub hash: String,
    /// Written by the local node.
    pub is_self: bool,
    /// First message of its origin (`seq_id == 0`); shown emphasised.
    pub is_origin: bool,
}

impl MessageRow {
    /// Tooltip-style detail line: when, via whom, which id, which hash.
    pub fn details(&self) -> String {
        let mut parts = vec![format!("seen {}", self.date)];
        if !self.relay.is_empty() {
            parts.push(format!("relay {}", self.relay));
        }
        parts.push(format!("id {}", self.seq_id));
        if !self.hash.is_empty() {
            parts.push(format!("hash {}", short_hash(&self.hash)));
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRow {
    pub address: String,
    pub kind_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRow {
    pub origin: String,
    /// `"through <next hop>"`, or empty when the node does not report it.
    pub via: String,
    /// A conversation tab is open for this origin.
    pub has_tab: bool,
}

/// Maps a feed to rows, preserving the backend's order.
pub fn render_messages(messages: &[MessageRecord], identity: &str) -> Vec<MessageRow> {
    messages
        .iter()
        .map(|m| MessageRow {
            author: m.from_node.clone(),
            relay: m.from_address.clone(),
            seq_id: m.seq_id,
            date: format_date(&m.first_seen),
            content: m.content.clone(),
            hash: m.hash.clone(),
            is_self: !identity.is_empty() && m.from_node == identity,
            is_origin: m.seq_id == 0,
        })
        .collect()
}

/// Peers sorted by address.
pub fn render_peers(peers: &[PeerRecord]) -> Vec<PeerRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<PeerRow> = peers
        .iter()
        .filter(|p| seen.insert(p.address.as_str()))
        .map(|p| PeerRow {
            address: p.address.clone(),
            kind_label: p.kind.label(),
        })
        .collect();
    rows.sort_by(|a, b| a.address.cmp(&b.address));
    rows
}

/// Routes sorted by origin. `is_open` tells which origins have a tab.
pub fn render_routes(routes: &[RouteRecord], is_open: impl Fn(&str) -> bool) -> Vec<RouteRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<RouteRow> = routes
        .iter()
        .filter(|r| seen.insert(r.origin.as_str()))
        .map(|r| RouteRow {
            origin: r.origin.clone(),
            via: if r.next_hop_address.is_empty() {
                String::new()
            } else {
                format!("through {}", r.next_hop_address)
            },
            has_tab: is_open(&r.origin),
        })
        .collect();
    rows.sort_by(|a, b| a.origin.cmp(&b.origin));
    rows
}

/// Calendar date of a `FirstSeen` timestamp.
///
/// RFC 3339 input is parsed; anything else falls back to its first ten
/// characters, which is the date part of every format the node has used.
pub fn format_date(first_seen: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(first_seen) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    first_seen.chars().take(10).collect()
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
