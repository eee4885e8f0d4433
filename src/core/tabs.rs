//! # Conversation Tabs
//!
//! One tab per peer, keyed by peer name. The tab value is both the entry in
//! the tab strip and the content it shows, so the two can never drift apart.
//!
//! Refreshes are tagged with `(tab_id, generation)`. A refresh that lands
//! after its tab was closed (or closed and reopened) fails the id check and
//! is dropped.

use std::collections::HashMap;

use crate::node::MessageRecord;

/// Ordinal of the primary gossip view. Peer tabs count up from the next one.
pub const PRIMARY_TAB_ORDINAL: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTab {
    pub peer_name: String,
    /// Never reused, even after the tab is closed.
    pub tab_id: u64,
    pub messages: Vec<MessageRecord>,
    /// False until the first refresh lands.
    pub loaded: bool,
    refresh_generation: u64,
    refresh_in_flight: bool,
}

/// Token identifying one private-feed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub tab_id: u64,
    pub generation: u64,
}

#[derive(Debug)]
pub struct ConversationTabs {
    tabs: HashMap<String, ConversationTab>,
    next_tab_id: u64,
}

impl Default for ConversationTabs {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTabs {
    pub fn new() -> Self {
        Self {
            tabs: HashMap::new(),
            next_tab_id: PRIMARY_TAB_ORDINAL + 1,
        }
    }

    /// Opens a tab for `peer_name` unless one exists. Returns true if created.
    pub fn select_peer(&mut self, peer_name: &str) -> bool {
        if self.tabs.contains_key(peer_name) {
            return false;
        }
        let tab = ConversationTab {
            peer_name: peer_name.to_string(),
            tab_id: self.next_tab_id,
            messages: Vec::new(),
            loaded: false,
            refresh_generation: 0,
            refresh_in_flight: false,
        };
        self.next_tab_id += 1;
        self.tabs.insert(peer_name.to_string(), tab);
        true
    }

    /// Removes the tab for `peer_name`. Returns true if one was open.
    pub fn close_peer(&mut self, peer_name: &str) -> bool {
        self.tabs.remove(peer_name).is_some()
    }

    pub fn get(&self, peer_name: &str) -> Option<&ConversationTab> {
        self.tabs.get(peer_name)
    }

    pub fn contains(&self, peer_name: &str) -> bool {
        self.tabs.contains_key(peer_name)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Open tabs in the order they were created.
    pub fn ordered(&self) -> Vec<&ConversationTab> {
        let mut tabs: Vec<&ConversationTab> = self.tabs.values().collect();
        tabs.sort_by_key(|t| t.tab_id);
        tabs
    }

    /// Issues a refresh for an open tab, or `None` if the tab is closed or a
    /// refresh is already in flight for it.
    pub fn begin_refresh(&mut self, peer_name: &str) -> Option<RefreshTicket> {
        let tab = self.tabs.get_mut(peer_name)?;
        if tab.refresh_in_flight {
            return None;
        }
        tab.refresh_generation += 1;
        tab.refresh_in_flight = true;
        Some(RefreshTicket {
            tab_id: tab.tab_id,
            generation: tab.refresh_generation,
        })
    }

    /// Replaces the tab's content with `messages` if the ticket still belongs
    /// to the open tab. Returns false when the result is stale.
    pub fn apply_refresh(
        &mut self,
        peer_name: &str,
        ticket: RefreshTicket,
        messages: Vec<MessageRecord>,
    ) -> bool {
        let Some(tab) = self.current_tab_mut(peer_name, ticket) else {
            return false;
        };
        tab.messages = messages;
        tab.loaded = true;
        tab.refresh_in_flight = false;
        true
    }

    /// Releases the in-flight slot after a failed refresh. Content is kept.
    pub fn fail_refresh(&mut self, peer_name: &str, ticket: RefreshTicket) -> bool {
        let Some(tab) = self.current_tab_mut(peer_name, ticket) else {
            return false;
        };
        tab.refresh_in_flight = false;
        true
    }

    fn current_tab_mut(
        &mut self,
        peer_name: &str,
        ticket: RefreshTicket,
    ) -> Option<&mut ConversationTab> {
        self.tabs
            .get_mut(peer_name)
            .filter(|t| t.tab_id == ticket.tab_id && t.refresh_generation == ticket.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::message;

    #[test]
    fn test_select_is_idempotent() {
        let mut tabs = ConversationTabs::new();
        assert!(tabs.select_peer("alice"));
        assert!(!tabs.select_peer("alice"));
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs.get("alice").unwrap().tab_id, PRIMARY_TAB_ORDINAL + 1);
    }

    #[test]
    fn test_close_then_select_gives_fresh_empty_tab() {
        let mut tabs = ConversationTabs::new();
        tabs.select_peer("alice");
        let ticket = tabs.begin_refresh("alice").unwrap();
        assert!(tabs.apply_refresh("alice", ticket, vec![message("alice", "hi", 1)]));
        assert_eq!(tabs.get("alice").unwrap().messages.len(), 1);

        assert!(tabs.close_peer("alice"));
        assert!(!tabs.close_peer("alice"));
        assert!(tabs.select_peer("alice"));

        let fresh = tabs.get("alice").unwrap();
        assert!(fresh.messages.is_empty());
        assert!(!fresh.loaded);
        assert_ne!(fresh.tab_id, ticket.tab_id, "ordinals are never reused");
    }

    #[test]
    fn test_refresh_after_close_is_dropped() {
        let mut tabs = ConversationTabs::new();
        tabs.select_peer("bob");
        let ticket = tabs.begin_refresh("bob").unwrap();
        tabs.close_peer("bob");

        assert!(!tabs.apply_refresh("bob", ticket, vec![message("bob", "late", 2)]));
        assert!(!tabs.contains("bob"), "stale refresh must not recreate the tab");
    }

    #[test]
    fn test_refresh_from_previous_incarnation_is_dropped() {
        let mut tabs = ConversationTabs::new();
        tabs.select_peer("bob");
        let old_ticket = tabs.begin_refresh("bob").unwrap();
        tabs.close_peer("bob");
        tabs.select_peer("bob");

        assert!(!tabs.apply_refresh("bob", old_ticket, vec![message("bob", "late", 2)]));
        let tab = tabs.get("bob").unwrap();
        assert!(tab.messages.is_empty());
        assert!(!tab.loaded);
    }

    #[test]
    fn test_one_refresh_in_flight_per_tab() {
        let mut tabs = ConversationTabs::new();
        tabs.select_peer("carol");
        let ticket = tabs.begin_refresh("carol").unwrap();
        assert_eq!(tabs.begin_refresh("carol"), None);
        assert!(tabs.fail_refresh("carol", ticket));
        let next = tabs.begin_refresh("carol").unwrap();
        assert!(next.generation > ticket.generation);
        assert!(!tabs.apply_refresh("carol", ticket, Vec::new()), "superseded generation");
        assert!(tabs.apply_refresh("carol", next, Vec::new()));
    }

    #[test]
    fn test_refresh_for_unknown_peer_is_none() {
        let mut tabs = ConversationTabs::new();
        assert_eq!(tabs.begin_refresh("nobody"), None);
    }

    #[test]
    fn test_ordered_follows_creation() {
        let mut tabs = ConversationTabs::new();
        tabs.select_peer("zed");
        tabs.select_peer("amy");
        tabs.select_peer("mia");
        tabs.close_peer("amy");
        let names: Vec<&str> = tabs.ordered().iter().map(|t| t.peer_name.as_str()).collect();
        assert_eq!(names, vec!["zed", "mia"]);
    }
}
