//! # Incremental Search
//!
//! A search is one long-lived request whose body grows while the node keeps
//! asking its peers. The session remembers how many bytes of that body it
//! has already turned into entries and only ever processes the unseen tail:
//!
//! ```text
//! received:  "a\nb"           → increment "a\nb"    → entries a, b
//! received:  "a\nb\nc\n"      → increment "\nc\n"   → entries c
//! ```
//!
//! Sessions are numbered. Progress tagged with an old session id is ignored,
//! so a superseded search can never write into the current one.

use crate::node::DownloadRequest;

/// Prefix the node puts in front of `<name>:<hash>` for downloadable results.
pub const DOWNLOADABLE_PREFIX: &str = "Downloadable match: ";

/// Shown while a running search has not produced its first line.
pub const STARTED_TEXT: &str = "Search started...";

/// Entry appended when the node closes the stream normally.
pub const COMPLETED_TEXT: &str = "Search completed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEntry {
    Info(String),
    Downloadable { name: String, hash: String },
}

impl SearchEntry {
    /// Interprets one non-empty line of the search stream.
    pub fn parse(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix(DOWNLOADABLE_PREFIX)
            && let Some((name, hash)) = rest.rsplit_once(':')
            && !name.is_empty()
            && !hash.is_empty()
        {
            return SearchEntry::Downloadable {
                name: name.to_string(),
                hash: hash.to_string(),
            };
        }
        SearchEntry::Info(line.to_string())
    }

    /// The download this entry offers, fetched from whichever peer has it.
    pub fn download_request(&self) -> Option<DownloadRequest> {
        match self {
            SearchEntry::Downloadable { name, hash } => Some(DownloadRequest {
                name: name.clone(),
                hash: hash.clone(),
                peer: String::new(),
            }),
            SearchEntry::Info(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Running,
    Completed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: u64,
    pub keywords: String,
    pub budget: u32,
    pub entries: Vec<SearchEntry>,
    pub status: SearchStatus,
    consumed: usize,
    received: String,
}

impl SearchSession {
    fn new(id: u64, keywords: String, budget: u32) -> Self {
        Self {
            id,
            keywords,
            budget,
            entries: Vec::new(),
            status: SearchStatus::Running,
            consumed: 0,
            received: String::new(),
        }
    }

    /// Bytes of the response already turned into entries.
    pub fn consumed_bytes(&self) -> usize {
        self.consumed
    }

    pub fn is_running(&self) -> bool {
        self.status == SearchStatus::Running
    }

    /// Processes the unseen tail of the cumulative `response` buffer and
    /// returns how many entries were added.
    ///
    /// A buffer shorter than what was already consumed, or one that no longer
    /// ends on a char boundary at the old offset, adds nothing.
    pub fn observe(&mut self, response: &str) -> usize {
        if !self.is_running() {
            return 0;
        }
        let Some(increment) = response.get(self.consumed..) else {
            return 0;
        };
        self.consumed = response.len();

        let before = self.entries.len();
        self.entries.extend(
            increment
                .split('\n')
                .filter(|line| !line.is_empty())
                .map(SearchEntry::parse),
        );
        self.entries.len() - before
    }

    /// Appends a network chunk to the received buffer and observes it.
    pub fn push_chunk(&mut self, chunk: &str) -> usize {
        if !self.is_running() {
            return 0;
        }
        let mut received = std::mem::take(&mut self.received);
        received.push_str(chunk);
        let added = self.observe(&received);
        self.received = received;
        added
    }

    fn complete(&mut self) {
        if self.is_running() {
            self.entries.push(SearchEntry::Info(COMPLETED_TEXT.to_string()));
            self.status = SearchStatus::Completed;
        }
    }

    fn fail(&mut self, reason: String) {
        if self.is_running() {
            self.status = SearchStatus::Failed(reason);
        }
    }
}

/// Owns the single active search session.
#[derive(Debug, Default)]
pub struct SearchState {
    session: Option<SearchSession>,
    last_id: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    /// Replaces any current session with a new, empty one and returns its id.
    pub fn start(&mut self, keywords: String, budget: u32) -> u64 {
        self.last_id += 1;
        self.session = Some(SearchSession::new(self.last_id, keywords, budget));
        self.last_id
    }

    fn current_mut(&mut self, session_id: u64) -> Option<&mut SearchSession> {
        self.session.as_mut().filter(|s| s.id == session_id)
    }

    /// Feeds a chunk to the session it belongs to. Returns `None` for a
    /// superseded session, otherwise the number of entries added.
    pub fn push_chunk(&mut self, session_id: u64, chunk: &str) -> Option<usize> {
        self.current_mut(session_id).map(|s| s.push_chunk(chunk))
    }

    /// Marks the session completed. Returns false for a superseded session.
    pub fn complete(&mut self, session_id: u64) -> bool {
        self.current_mut(session_id).map(SearchSession::complete).is_some()
    }

    /// Marks the session failed, keeping partial entries.
    pub fn fail(&mut self, session_id: u64, reason: String) -> bool {
        self.current_mut(session_id).map(|s| s.fail(reason)).is_some()
    }
}
