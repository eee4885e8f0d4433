//! # Application State
//!
//! Core business state for peerdeck. This module contains domain logic only;
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── client: Arc<dyn NodeClient>   // the node we control
//! ├── identity / peers / messages / routes
//! │                                 // last applied snapshot, replaced as a whole
//! ├── connection: ConnectionState   // connecting / connected / disconnected
//! ├── sync: SyncState               // tick generation, timer id, in-flight guard
//! ├── tabs: ConversationTabs        // per-peer private feeds, keyed by name
//! ├── search: SearchState           // the single active search session
//! ├── view: View                    // what the body shows and where text goes
//! ├── is_sending: bool              // a message send is in flight
//! └── status_message: String        // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::ResolvedConfig;
use crate::core::search::SearchState;
use crate::core::sync::{ConnectionState, ReconnectPolicy, SyncState};
use crate::core::tabs::ConversationTabs;
use crate::node::{MessageRecord, NodeClient, PeerRecord, RouteRecord, Snapshot};

/// The view shown in the body of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// Public gossip feed. Typed text is broadcast.
    #[default]
    Gossip,
    /// Results of the current search. Typed text starts a search.
    Search,
    /// Private conversation with one peer. Typed text is sent to that peer.
    Peer(String),
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::Gossip => "Gossip".to_string(),
            View::Search => "Search".to_string(),
            View::Peer(name) => name.clone(),
        }
    }
}

pub struct App {
    pub client: Arc<dyn NodeClient>,
    pub identity: String,
    pub peers: Vec<PeerRecord>,
    pub messages: Vec<MessageRecord>,
    pub routes: Vec<RouteRecord>,
    pub connection: ConnectionState,
    pub sync: SyncState,
    pub tabs: ConversationTabs,
    pub search: SearchState,
    pub view: View,
    /// True while a broadcast or private message is on its way to the node.
    pub is_sending: bool,
    pub status_message: String,
    pub poll_interval: Duration,
    pub reconnect: ReconnectPolicy,
    pub default_budget: u32,
    pub download_dir: PathBuf,
}

impl App {
    pub fn from_config(client: Arc<dyn NodeClient>, config: &ResolvedConfig) -> Self {
        Self {
            client,
            identity: String::new(),
            peers: Vec::new(),
            messages: Vec::new(),
            routes: Vec::new(),
            connection: ConnectionState::default(),
            sync: SyncState::new(),
            tabs: ConversationTabs::new(),
            search: SearchState::new(),
            view: View::default(),
            is_sending: false,
            status_message: format!("Connecting to {}", config.node_url),
            poll_interval: config.poll_interval,
            reconnect: config.reconnect,
            default_budget: config.default_budget,
            download_dir: config.download_dir.clone(),
        }
    }

    /// Replaces all four snapshot resources in one step.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.identity = snapshot.identity;
        self.peers = snapshot.peers;
        self.messages = snapshot.messages;
        self.routes = snapshot.routes;
    }

    pub fn has_peer(&self, address: &str) -> bool {
        self.peers.iter().any(|p| p.address == address)
    }

    /// Views in tab-strip order: gossip, search, then peer tabs by ordinal.
    pub fn views(&self) -> Vec<View> {
        let mut views = vec![View::Gossip, View::Search];
        views.extend(
            self.tabs
                .ordered()
                .into_iter()
                .map(|t| View::Peer(t.peer_name.clone())),
        );
        views
    }

    /// The view after the current one, wrapping around.
    pub fn next_view(&self) -> View {
        let views = self.views();
        let current = views.iter().position(|v| *v == self.view).unwrap_or(0);
        views[(current + 1) % views.len()].clone()
    }

    /// Messages the body should show for the current view.
    pub fn visible_messages(&self) -> &[MessageRecord] {
        match &self.view {
            View::Gossip => &self.messages,
            View::Peer(name) => self
                .tabs
                .get(name)
                .map(|t| t.messages.as_slice())
                .unwrap_or_default(),
            View::Search => &[],
        }
    }
}
