//! # Actions
//!
//! Everything that can happen in peerdeck becomes an `Action`.
//! A poll timer fires? That's `Action::TimerFired(id)`.
//! The node answers the joint fetch? That's `Action::SnapshotLoaded { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the `Effect`s the adapter must carry out. No I/O
//! happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + [Effect]
//! ```
//!
//! Every asynchronous result comes back tagged with the token it was issued
//! under (tick generation, tab ticket, search session id). `update` checks
//! the token before touching state, so late or superseded results are
//! dropped instead of overwriting newer data.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};

use crate::core::command::{self, Input};
use crate::core::state::{App, View};
use crate::core::sync::{ConnectionState, ReconnectPolicy};
use crate::core::tabs::RefreshTicket;
use crate::node::{DownloadRequest, MessageRecord, OutgoingPrivateMessage, SearchQuery, Snapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// First action after launch: starts the polling chain.
    Start,
    TimerFired(u64),
    /// Manual refresh / reconnect.
    Refresh,
    SnapshotLoaded {
        generation: u64,
        result: Result<Snapshot, String>,
    },
    PrivateMessagesLoaded {
        peer: String,
        ticket: RefreshTicket,
        result: Result<Vec<MessageRecord>, String>,
    },
    SelectPeer(String),
    ClosePeer(String),
    CloseActiveTab,
    ShowView(View),
    NextView,
    /// A raw line from the input box.
    Submit(String),
    AddPeer(String),
    DeletePeer(String),
    Rename(String),
    StartSearch {
        keywords: String,
        budget: u32,
    },
    SearchChunk {
        session_id: u64,
        chunk: String,
    },
    SearchFinished {
        session_id: u64,
        result: Result<(), String>,
    },
    DownloadMatch(DownloadRequest),
    Upload(PathBuf),
    CommandFinished {
        command: Command,
        result: Result<String, String>,
    },
    Quit,
}

/// One mutating request to the node.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Broadcast(String),
    SendPrivate(OutgoingPrivateMessage),
    /// The node toggles membership; `adding` records which way we expect it to go.
    TogglePeer { address: String, adding: bool },
    Rename(String),
    Download {
        request: DownloadRequest,
        dir: PathBuf,
    },
    Upload(PathBuf),
}

impl Command {
    pub fn label(&self) -> String {
        match self {
            Command::Broadcast(_) => "Broadcast".to_string(),
            Command::SendPrivate(m) => format!("Message to {}", m.destination),
            Command::TogglePeer {
                address,
                adding: true,
            } => format!("Adding peer {address}"),
            Command::TogglePeer { address, .. } => format!("Removing peer {address}"),
            Command::Rename(name) => format!("Rename to {name}"),
            Command::Download { request, .. } => format!("Download of {}", request.name),
            Command::Upload(path) => format!("Upload of {}", path.display()),
        }
    }

    fn is_message(&self) -> bool {
        matches!(self, Command::Broadcast(_) | Command::SendPrivate(_))
    }

    fn success_message(&self, detail: &str) -> String {
        match self {
            Command::Broadcast(_) => "Message sent".to_string(),
            Command::SendPrivate(m) => format!("Message sent to {}", m.destination),
            Command::TogglePeer {
                address,
                adding: true,
            } => format!("Added peer {address}"),
            Command::TogglePeer { address, .. } => format!("Removed peer {address}"),
            Command::Rename(name) => format!("Renamed to {name}"),
            Command::Download { request, .. } => format!("Saved {} to {}", request.name, detail),
            Command::Upload(path) if detail.is_empty() => format!("Shared {}", path.display()),
            Command::Upload(path) => format!("Shared {}: {}", path.display(), detail),
        }
    }
}

/// Work for the adapter. Each one is a spawned task that reports back with
/// an `Action`, except `PinToBottom` and `Quit`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSnapshot {
        generation: u64,
    },
    ScheduleTick {
        timer_id: u64,
        delay: Duration,
    },
    RefreshTab {
        peer: String,
        ticket: RefreshTicket,
    },
    StartSearch {
        session_id: u64,
        query: SearchQuery,
    },
    Run(Command),
    /// Re-attach the message list to its newest entry.
    PinToBottom,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Start | Action::Refresh => request_tick(app),
        Action::TimerFired(timer_id) => {
            if app.sync.timer_fired(timer_id) {
                request_tick(app)
            } else {
                debug!("Ignoring stale timer {}", timer_id);
                Vec::new()
            }
        }
        Action::SnapshotLoaded { generation, result } => snapshot_loaded(app, generation, result),
        Action::PrivateMessagesLoaded {
            peer,
            ticket,
            result,
        } => {
            match result {
                Ok(messages) => {
                    if !app.tabs.apply_refresh(&peer, ticket, messages) {
                        debug!("Dropping stale conversation refresh for {}", peer);
                    }
                }
                Err(e) => {
                    if app.tabs.fail_refresh(&peer, ticket) {
                        warn!("Conversation refresh for {} failed: {}", peer, e);
                        app.status_message = format!("Could not load messages with {peer}: {e}");
                    }
                }
            }
            Vec::new()
        }
        Action::SelectPeer(peer) => select_peer(app, peer),
        Action::ClosePeer(peer) => {
            if app.tabs.close_peer(&peer) {
                info!("Closed conversation tab for {}", peer);
                if app.view == View::Peer(peer) {
                    app.view = View::Gossip;
                }
            }
            Vec::new()
        }
        Action::CloseActiveTab => match app.view.clone() {
            View::Peer(peer) => update(app, Action::ClosePeer(peer)),
            _ => {
                app.status_message = "No conversation tab is active".to_string();
                Vec::new()
            }
        },
        Action::ShowView(view) => {
            let exists = match &view {
                View::Peer(peer) => app.tabs.contains(peer),
                View::Gossip | View::Search => true,
            };
            if exists {
                app.view = view;
            }
            Vec::new()
        }
        Action::NextView => {
            app.view = app.next_view();
            Vec::new()
        }
        Action::Submit(line) => submit(app, &line),
        Action::AddPeer(address) => {
            if app.has_peer(&address) {
                // One endpoint toggles both ways: posting a present peer would remove it.
                app.status_message = format!("{address} is already a peer");
                return Vec::new();
            }
            app.status_message = format!("Adding peer {address}...");
            vec![Effect::Run(Command::TogglePeer {
                address,
                adding: true,
            })]
        }
        Action::DeletePeer(address) => {
            if !app.has_peer(&address) {
                app.status_message = format!("{address} is not a peer");
                return Vec::new();
            }
            app.status_message = format!("Removing peer {address}...");
            vec![Effect::Run(Command::TogglePeer {
                address,
                adding: false,
            })]
        }
        Action::Rename(name) => {
            app.status_message = format!("Renaming to {name}...");
            vec![Effect::Run(Command::Rename(name))]
        }
        Action::StartSearch { keywords, budget } => {
            let keywords = keywords.trim().to_string();
            if keywords.is_empty() {
                app.status_message = "Search needs at least one keyword".to_string();
                return Vec::new();
            }
            let session_id = app.search.start(keywords.clone(), budget);
            info!(
                "Starting search session {} (keywords={:?}, budget={})",
                session_id, keywords, budget
            );
            app.view = View::Search;
            app.status_message = format!("Searching for {keywords}...");
            vec![Effect::StartSearch {
                session_id,
                query: SearchQuery { keywords, budget },
            }]
        }
        Action::SearchChunk { session_id, chunk } => {
            if app.search.push_chunk(session_id, &chunk).is_none() {
                debug!("Dropping chunk for superseded search session {}", session_id);
            }
            Vec::new()
        }
        Action::SearchFinished { session_id, result } => {
            match result {
                Ok(()) => {
                    if app.search.complete(session_id) {
                        app.status_message = "Search completed".to_string();
                    }
                }
                Err(e) => {
                    if app.search.fail(session_id, e.clone()) {
                        warn!("Search session {} failed: {}", session_id, e);
                        app.status_message = format!("Search failed: {e}");
                    }
                }
            }
            Vec::new()
        }
        Action::DownloadMatch(request) => {
            app.status_message = format!("Downloading {request}...");
            vec![Effect::Run(Command::Download {
                request,
                dir: app.download_dir.clone(),
            })]
        }
        Action::Upload(path) => {
            app.status_message = format!("Uploading {}...", path.display());
            vec![Effect::Run(Command::Upload(path))]
        }
        Action::CommandFinished { command, result } => command_finished(app, command, result),
        Action::Quit => vec![Effect::Quit],
    }
}

/// Starts a tick now, or folds the request into the one in flight.
fn request_tick(app: &mut App) -> Vec<Effect> {
    match app.sync.begin_tick() {
        Some(generation) => {
            debug!("Starting tick {}", generation);
            vec![Effect::FetchSnapshot { generation }]
        }
        None => {
            debug!("Tick already in flight, refresh coalesced");
            Vec::new()
        }
    }
}

fn snapshot_loaded(app: &mut App, generation: u64, result: Result<Snapshot, String>) -> Vec<Effect> {
    if !app.sync.finish(generation) {
        debug!("Dropping stale snapshot for tick {}", generation);
        return Vec::new();
    }

    let mut effects = Vec::new();
    let succeeded = result.is_ok();
    match result {
        Ok(snapshot) => {
            if app.connection != ConnectionState::Connected {
                info!("Connected to node as {:?}", snapshot.identity);
                app.status_message = format!("Connected as {}", snapshot.identity);
            }
            app.connection = ConnectionState::Connected;
            app.apply_snapshot(snapshot);

            let open_origins: Vec<String> = app
                .routes
                .iter()
                .map(|r| r.origin.clone())
                .filter(|origin| app.tabs.contains(origin))
                .collect();
            for peer in open_origins {
                if let Some(ticket) = app.tabs.begin_refresh(&peer) {
                    effects.push(Effect::RefreshTab { peer, ticket });
                }
            }
        }
        Err(reason) => {
            warn!("Tick {} failed: {}", generation, reason);
            app.connection = ConnectionState::Disconnected { reason };
            app.status_message = match app.reconnect {
                ReconnectPolicy::Auto => "Node unreachable, retrying".to_string(),
                ReconnectPolicy::Manual => "Node unreachable, press Ctrl+R to reconnect".to_string(),
            };
        }
    }

    if app.sync.take_refresh_request() {
        effects.extend(request_tick(app));
    } else if succeeded || app.reconnect == ReconnectPolicy::Auto {
        let timer_id = app.sync.arm_timer();
        effects.push(Effect::ScheduleTick {
            timer_id,
            delay: app.poll_interval,
        });
    }
    effects
}

fn select_peer(app: &mut App, peer: String) -> Vec<Effect> {
    let peer = peer.trim().to_string();
    if peer.is_empty() {
        return Vec::new();
    }
    let created = app.tabs.select_peer(&peer);
    app.view = View::Peer(peer.clone());
    if !created {
        return Vec::new();
    }
    info!("Opened conversation tab for {}", peer);
    match app.tabs.begin_refresh(&peer) {
        Some(ticket) => vec![Effect::RefreshTab { peer, ticket }],
        None => Vec::new(),
    }
}

fn submit(app: &mut App, line: &str) -> Vec<Effect> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    let input = match command::parse(line) {
        Ok(input) => input,
        Err(e @ command::CommandError::UnknownCommand(_)) => {
            app.status_message = format!("{e}. {}", command::HELP);
            return Vec::new();
        }
        Err(e) => {
            app.status_message = e.to_string();
            return Vec::new();
        }
    };

    match input {
        Input::Send(text) => send_text(app, text),
        Input::AddPeer(address) => update(app, Action::AddPeer(address)),
        Input::RemovePeer(address) => update(app, Action::DeletePeer(address)),
        Input::Rename(name) => update(app, Action::Rename(name)),
        Input::OpenTab(peer) => update(app, Action::SelectPeer(peer)),
        Input::CloseTab => update(app, Action::CloseActiveTab),
        Input::Search { keywords, budget } => {
            let budget = budget.unwrap_or(app.default_budget);
            update(app, Action::StartSearch { keywords, budget })
        }
        Input::Download(request) => update(app, Action::DownloadMatch(request)),
        Input::Upload(path) => update(app, Action::Upload(path)),
        Input::Refresh => update(app, Action::Refresh),
        Input::Help => {
            app.status_message = command::HELP.to_string();
            Vec::new()
        }
        Input::Quit => update(app, Action::Quit),
    }
}

/// Routes plain text by the active view.
fn send_text(app: &mut App, text: String) -> Vec<Effect> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if app.view == View::Search {
        let budget = app.default_budget;
        return update(
            app,
            Action::StartSearch {
                keywords: text,
                budget,
            },
        );
    }
    let command = match &app.view {
        View::Search | View::Gossip => Command::Broadcast(text),
        View::Peer(peer) => Command::SendPrivate(OutgoingPrivateMessage {
            destination: peer.clone(),
            content: text,
        }),
    };
    if app.is_sending {
        app.status_message = "Still sending the previous message".to_string();
        return Vec::new();
    }
    app.is_sending = true;
    app.status_message = "Sending...".to_string();
    vec![Effect::Run(command)]
}

fn command_finished(app: &mut App, command: Command, result: Result<String, String>) -> Vec<Effect> {
    if command.is_message() {
        app.is_sending = false;
    }
    let detail = match result {
        Ok(detail) => detail,
        Err(e) => {
            warn!("{} failed: {}", command.label(), e);
            app.status_message = format!("{} failed: {}", command.label(), e);
            return Vec::new();
        }
    };

    info!("{} succeeded", command.label());
    app.status_message = command.success_message(&detail);

    let mut effects = Vec::new();
    if command.is_message() {
        effects.push(Effect::PinToBottom);
    }
    if let Command::SendPrivate(message) = &command
        && let Some(ticket) = app.tabs.begin_refresh(&message.destination)
    {
        effects.push(Effect::RefreshTab {
            peer: message.destination.clone(),
            ticket,
        });
    }
    effects.extend(request_tick(app));
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::{SearchEntry, SearchStatus};
    use crate::node::PeerKind;
    use crate::test_support::{message, peer, route, snapshot, test_app};

    /// Drives the app through one successful tick.
    fn connect(app: &mut App, snap: Snapshot) -> Vec<Effect> {
        let effects = update(app, Action::Start);
        let [Effect::FetchSnapshot { generation }] = effects.as_slice() else {
            panic!("expected a fetch, got {effects:?}");
        };
        update(
            app,
            Action::SnapshotLoaded {
                generation: *generation,
                result: Ok(snap),
            },
        )
    }

    fn timer_of(effects: &[Effect]) -> Option<u64> {
        effects.iter().find_map(|e| match e {
            Effect::ScheduleTick { timer_id, .. } => Some(*timer_id),
            _ => None,
        })
    }

    #[test]
    fn test_successful_tick_applies_snapshot_and_schedules_next() {
        let mut app = test_app();
        let effects = connect(&mut app, snapshot("me"));

        assert_eq!(app.identity, "me");
        assert_eq!(app.peers.len(), 1);
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.routes.len(), 1);
        assert_eq!(app.connection, ConnectionState::Connected);
        assert_eq!(
            effects,
            vec![Effect::ScheduleTick {
                timer_id: 1,
                delay: app.poll_interval
            }]
        );
    }

    #[test]
    fn test_failed_tick_leaves_views_untouched() {
        let mut app = test_app();
        let effects = connect(&mut app, snapshot("me"));
        let timer = timer_of(&effects).unwrap();

        let effects = update(&mut app, Action::TimerFired(timer));
        let [Effect::FetchSnapshot { generation }] = effects.as_slice() else {
            panic!("expected fetch");
        };
        let effects = update(
            &mut app,
            Action::SnapshotLoaded {
                generation: *generation,
                result: Err("connection refused".into()),
            },
        );

        assert_eq!(app.identity, "me");
        assert_eq!(app.peers, snapshot("me").peers);
        assert_eq!(app.messages, snapshot("me").messages);
        assert_eq!(app.routes, snapshot("me").routes);
        assert!(app.connection.is_disconnected());
        assert!(timer_of(&effects).is_some(), "auto policy keeps retrying");
    }

    #[test]
    fn test_manual_policy_waits_for_refresh() {
        let mut app = test_app();
        app.reconnect = ReconnectPolicy::Manual;
        let effects = update(&mut app, Action::Start);
        let [Effect::FetchSnapshot { generation }] = effects.as_slice() else {
            panic!("expected fetch");
        };
        let effects = update(
            &mut app,
            Action::SnapshotLoaded {
                generation: *generation,
                result: Err("timed out".into()),
            },
        );
        assert!(effects.is_empty());
        assert!(app.status_message.contains("Ctrl+R"));

        let effects = update(&mut app, Action::Refresh);
        assert!(matches!(effects.as_slice(), [Effect::FetchSnapshot { .. }]));
    }

    #[test]
    fn test_refresh_while_fetching_is_coalesced() {
        let mut app = test_app();
        let effects = update(&mut app, Action::Start);
        let [Effect::FetchSnapshot { generation }] = effects.as_slice() else {
            panic!("expected fetch");
        };
        let generation = *generation;

        assert!(update(&mut app, Action::Refresh).is_empty());
        assert!(update(&mut app, Action::Refresh).is_empty());

        let effects = update(
            &mut app,
            Action::SnapshotLoaded {
                generation,
                result: Ok(snapshot("me")),
            },
        );
        // The coalesced refresh runs right away instead of arming a timer.
        assert!(matches!(
            effects.as_slice(),
            [Effect::FetchSnapshot { generation: next }] if *next == generation + 1
        ));
    }

    #[test]
    fn test_stale_timer_and_snapshot_are_dropped() {
        let mut app = test_app();
        let effects = connect(&mut app, snapshot("me"));
        let old_timer = timer_of(&effects).unwrap();

        // A manual refresh supersedes the armed timer.
        let effects = update(&mut app, Action::Refresh);
        let [Effect::FetchSnapshot { generation }] = effects.as_slice() else {
            panic!("expected fetch");
        };
        let generation = *generation;
        assert!(update(&mut app, Action::TimerFired(old_timer)).is_empty());

        let mut other = snapshot("impostor");
        other.peers.clear();
        assert!(
            update(
                &mut app,
                Action::SnapshotLoaded {
                    generation: generation - 1,
                    result: Ok(other),
                }
            )
            .is_empty()
        );
        assert_eq!(app.identity, "me");
    }

    #[test]
    fn test_select_peer_opens_tab_and_refreshes_immediately() {
        let mut app = test_app();
        let effects = update(&mut app, Action::SelectPeer("alice".into()));
        assert_eq!(app.view, View::Peer("alice".into()));
        assert!(matches!(
            effects.as_slice(),
            [Effect::RefreshTab { peer, .. }] if peer == "alice"
        ));

        // Second selection only switches view.
        app.view = View::Gossip;
        assert!(update(&mut app, Action::SelectPeer("alice".into())).is_empty());
        assert_eq!(app.view, View::Peer("alice".into()));
        assert_eq!(app.tabs.len(), 1);
    }

    #[test]
    fn test_tick_refreshes_open_tabs_on_routes() {
        let mut app = test_app();
        let effects = update(&mut app, Action::SelectPeer("alice".into()));
        let [Effect::RefreshTab { ticket, .. }] = effects.as_slice() else {
            panic!("expected refresh");
        };
        update(
            &mut app,
            Action::PrivateMessagesLoaded {
                peer: "alice".into(),
                ticket: *ticket,
                result: Ok(vec![message("alice", "psst", 0)]),
            },
        );
        update(&mut app, Action::SelectPeer("nobody-routes-here".into()));

        let effects = connect(&mut app, snapshot("me"));
        let refreshed: Vec<&str> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::RefreshTab { peer, .. } => Some(peer.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(refreshed, vec!["alice"]);
    }

    #[test]
    fn test_refresh_after_close_does_not_recreate_tab() {
        let mut app = test_app();
        let effects = update(&mut app, Action::SelectPeer("bob".into()));
        let [Effect::RefreshTab { ticket, .. }] = effects.as_slice() else {
            panic!("expected refresh");
        };
        let ticket = *ticket;
        update(&mut app, Action::ClosePeer("bob".into()));
        assert_eq!(app.view, View::Gossip);

        update(
            &mut app,
            Action::PrivateMessagesLoaded {
                peer: "bob".into(),
                ticket,
                result: Ok(vec![message("bob", "late", 1)]),
            },
        );
        assert!(!app.tabs.contains("bob"));
    }

    #[test]
    fn test_text_routing_follows_view() {
        let mut app = test_app();
        let effects = update(&mut app, Action::Submit("hello all".into()));
        assert_eq!(
            effects,
            vec![Effect::Run(Command::Broadcast("hello all".into()))]
        );
        update(
            &mut app,
            Action::CommandFinished {
                command: Command::Broadcast("hello all".into()),
                result: Ok(String::new()),
            },
        );

        update(&mut app, Action::SelectPeer("alice".into()));
        let effects = update(&mut app, Action::Submit("just you".into()));
        assert_eq!(
            effects,
            vec![Effect::Run(Command::SendPrivate(OutgoingPrivateMessage {
                destination: "alice".into(),
                content: "just you".into(),
            }))]
        );
    }

    #[test]
    fn test_second_send_is_refused_while_first_in_flight() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Submit("one".into())).len(), 1);
        assert!(app.is_sending);
        assert!(update(&mut app, Action::Submit("two".into())).is_empty());

        // Commands still work while sending.
        let effects = update(&mut app, Action::Submit("/name carol".into()));
        assert_eq!(effects, vec![Effect::Run(Command::Rename("carol".into()))]);
    }

    #[test]
    fn test_send_success_pins_and_refreshes() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".into()));
        let effects = update(
            &mut app,
            Action::CommandFinished {
                command: Command::Broadcast("hi".into()),
                result: Ok(String::new()),
            },
        );
        assert!(!app.is_sending);
        assert_eq!(effects[0], Effect::PinToBottom);
        assert!(matches!(effects[1], Effect::FetchSnapshot { .. }));
    }

    #[test]
    fn test_send_failure_reenables_input_without_refresh() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".into()));
        let effects = update(
            &mut app,
            Action::CommandFinished {
                command: Command::Broadcast("hi".into()),
                result: Err("network error: refused".into()),
            },
        );
        assert!(effects.is_empty());
        assert!(!app.is_sending);
        assert!(app.status_message.contains("refused"));
    }

    #[test]
    fn test_peer_toggle_is_guarded_by_snapshot() {
        let mut app = test_app();
        connect(&mut app, snapshot("me"));

        // Present peer: add is a no-op, delete sends.
        assert!(update(&mut app, Action::AddPeer("127.0.0.1:5001".into())).is_empty());
        assert_eq!(
            update(&mut app, Action::DeletePeer("127.0.0.1:5001".into())),
            vec![Effect::Run(Command::TogglePeer {
                address: "127.0.0.1:5001".into(),
                adding: false
            })]
        );

        // Absent peer: delete is a no-op, add sends.
        assert!(update(&mut app, Action::DeletePeer("10.9.9.9:1".into())).is_empty());
        assert_eq!(
            update(&mut app, Action::Submit("/peer 10.9.9.9:1".into())),
            vec![Effect::Run(Command::TogglePeer {
                address: "10.9.9.9:1".into(),
                adding: true
            })]
        );
    }

    #[test]
    fn test_search_flow_and_supersession() {
        let mut app = test_app();
        let effects = update(&mut app, Action::Submit("/search report 2".into()));
        let [Effect::StartSearch { session_id: first, query }] = effects.as_slice() else {
            panic!("expected search");
        };
        let first = *first;
        assert_eq!(query.budget, 2);
        assert_eq!(app.view, View::Search);

        update(
            &mut app,
            Action::SearchChunk {
                session_id: first,
                chunk: "Downloadable match: report.pdf:abcd1234\n".into(),
            },
        );

        // Plain text in the search view starts a new search with the default budget.
        let effects = update(&mut app, Action::Submit("photo".into()));
        let [Effect::StartSearch { session_id: second, query }] = effects.as_slice() else {
            panic!("expected search");
        };
        assert_eq!(query.budget, app.default_budget);
        let second = *second;

        update(
            &mut app,
            Action::SearchChunk {
                session_id: first,
                chunk: "late line\n".into(),
            },
        );
        update(
            &mut app,
            Action::SearchFinished {
                session_id: first,
                result: Ok(()),
            },
        );
        let session = app.search.session().unwrap();
        assert_eq!(session.id, second);
        assert!(session.entries.is_empty());
        assert_eq!(session.status, SearchStatus::Running);

        update(
            &mut app,
            Action::SearchFinished {
                session_id: second,
                result: Err("connection reset".into()),
            },
        );
        assert_eq!(
            app.search.session().unwrap().status,
            SearchStatus::Failed("connection reset".into())
        );
    }

    #[test]
    fn test_download_uses_configured_dir() {
        let mut app = test_app();
        let entry = SearchEntry::parse("Downloadable match: a.txt:ff");
        let request = entry.download_request().unwrap();
        let effects = update(&mut app, Action::DownloadMatch(request.clone()));
        assert_eq!(
            effects,
            vec![Effect::Run(Command::Download {
                request,
                dir: app.download_dir.clone()
            })]
        );
    }

    #[test]
    fn test_command_errors_surface_in_status() {
        let mut app = test_app();
        assert!(update(&mut app, Action::Submit("/search".into())).is_empty());
        assert!(app.status_message.contains("keyword"));
        assert!(update(&mut app, Action::Submit("/bogus".into())).is_empty());
        assert!(app.status_message.contains("/peer"));
    }

    #[test]
    fn test_close_active_tab_falls_back_to_gossip() {
        let mut app = test_app();
        app.peers.push(peer("127.0.0.1:5001", PeerKind::Learned));
        app.routes.push(route("dave", ""));
        update(&mut app, Action::SelectPeer("dave".into()));
        update(&mut app, Action::Submit("/close".into()));
        assert_eq!(app.view, View::Gossip);
        assert!(app.tabs.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), vec![Effect::Quit]);
        assert_eq!(update(&mut app, Action::Submit("/quit".into())), vec![Effect::Quit]);
    }
}
