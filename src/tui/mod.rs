//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the panel,
//! translates keyboard events into `core::Action` values and carries out the
//! `Effect`s the reducer returns.
//!
//! This is the only module that knows about ratatui, crossterm and tokio
//! tasks. Every network call runs in a spawned task and reports back through
//! an `std::sync::mpsc` channel that the loop drains between frames.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop only redraws after a terminal event or
//! after at least one background action was applied.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio::task::AbortHandle;

use crate::core::action::{Action, Command, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::render::{render_peers, render_routes};
use crate::core::search::SearchEntry;
use crate::core::state::{App, View};
use crate::node::{HttpNodeClient, NodeClient, NodeError, files};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, ListPaneEvent, ListPaneState, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// How long the loop blocks waiting for a key before draining background actions.
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Which pane receives keys that aren't global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Peers,
    Routes,
    /// Only reachable while the Search view is shown.
    Search,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    /// Scroll position per view, so each conversation keeps its own place.
    pub message_lists: HashMap<View, MessageListState>,
    pub input_box: InputBox,
    pub peer_pane: ListPaneState,
    pub route_pane: ListPaneState,
    pub search_pane: ListPaneState,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_lists: HashMap::new(),
            input_box: InputBox::new(),
            peer_pane: ListPaneState::new(),
            route_pane: ListPaneState::new(),
            search_pane: ListPaneState::new(),
            focus: Focus::Input, // User expects to type immediately
        }
    }

    pub fn message_list(&mut self, view: &View) -> &mut MessageListState {
        self.message_lists.entry(view.clone()).or_default()
    }

    pub fn has_unseen_content(&self, view: &View) -> bool {
        self.message_lists
            .get(view)
            .is_some_and(MessageListState::has_unseen_content)
    }

    /// Drops scroll state for conversation tabs that were closed.
    pub fn forget_closed_views(&mut self, app: &App) {
        self.message_lists.retain(|view, _| match view {
            View::Peer(name) => app.tabs.contains(name),
            _ => true,
        });
    }

    fn focus_order(view: &View) -> Vec<Focus> {
        match view {
            View::Search => vec![Focus::Input, Focus::Search, Focus::Peers, Focus::Routes],
            _ => vec![Focus::Input, Focus::Peers, Focus::Routes],
        }
    }

    fn cycle_focus(&mut self, view: &View, forward: bool) {
        let order = Self::focus_order(view);
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
        );
    }
}

/// Translates one terminal event into at most one action, updating
/// presentation state (focus, cursor, scroll) along the way.
pub fn route_event(event: &TuiEvent, app: &App, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::Resize => return None,
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Refresh => return Some(Action::Refresh),
        TuiEvent::NextView => return Some(Action::NextView),
        TuiEvent::CloseTab => return Some(Action::CloseActiveTab),
        TuiEvent::FocusNext | TuiEvent::FocusPrev => {
            tui.cycle_focus(&app.view, *event == TuiEvent::FocusNext);
            return None;
        }
        TuiEvent::Escape => {
            tui.focus = Focus::Input;
            return None;
        }
        _ => {}
    }

    if tui.focus == Focus::Search && app.view != View::Search {
        tui.focus = Focus::Input;
    }

    match tui.focus {
        Focus::Input => {
            if matches!(
                event,
                TuiEvent::ScrollUp
                    | TuiEvent::ScrollDown
                    | TuiEvent::ScrollPageUp
                    | TuiEvent::ScrollPageDown
                    | TuiEvent::CursorUp
                    | TuiEvent::CursorDown
            ) {
                let scroll = match event {
                    TuiEvent::CursorUp => &TuiEvent::ScrollUp,
                    TuiEvent::CursorDown => &TuiEvent::ScrollDown,
                    other => other,
                };
                tui.message_list(&app.view).handle_event(scroll);
                return None;
            }
            match tui.input_box.handle_event(event)? {
                InputEvent::Submit(text) => Some(Action::Submit(text)),
                InputEvent::ContentChanged => None,
            }
        }
        Focus::Peers => {
            let rows = render_peers(&app.peers);
            match pane_event(&mut tui.peer_pane, &mut tui.input_box, &mut tui.focus, event)? {
                ListPaneEvent::Delete(i) => {
                    rows.get(i).map(|r| Action::DeletePeer(r.address.clone()))
                }
                ListPaneEvent::Activate(_) => None,
            }
        }
        Focus::Routes => {
            let rows = render_routes(&app.routes, |origin| app.tabs.contains(origin));
            match pane_event(&mut tui.route_pane, &mut tui.input_box, &mut tui.focus, event)? {
                ListPaneEvent::Activate(i) => {
                    rows.get(i).map(|r| Action::SelectPeer(r.origin.clone()))
                }
                ListPaneEvent::Delete(i) => rows
                    .get(i)
                    .filter(|r| r.has_tab)
                    .map(|r| Action::ClosePeer(r.origin.clone())),
            }
        }
        Focus::Search => {
            match pane_event(&mut tui.search_pane, &mut tui.input_box, &mut tui.focus, event)? {
                ListPaneEvent::Activate(i) => app
                    .search
                    .session()
                    .and_then(|s| s.entries.get(i))
                    .and_then(SearchEntry::download_request)
                    .map(Action::DownloadMatch),
                ListPaneEvent::Delete(_) => None,
            }
        }
    }
}

/// Feeds a list pane. Typing anything the pane doesn't understand moves
/// focus back to the input box and forwards the keystroke there.
fn pane_event(
    pane: &mut ListPaneState,
    input_box: &mut InputBox,
    focus: &mut Focus,
    event: &TuiEvent,
) -> Option<ListPaneEvent> {
    match event {
        TuiEvent::InputChar(c) if *c != 'd' => {
            *focus = Focus::Input;
            input_box.handle_event(event);
            None
        }
        TuiEvent::Paste(_) => {
            *focus = Focus::Input;
            input_box.handle_event(event);
            None
        }
        _ => pane.handle_event(event),
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let client: Arc<dyn NodeClient> =
        Arc::new(HttpNodeClient::new(config.node_url.clone(), config.request_timeout));
    let mut app = App::from_config(client, &config);
    let mut tui = TuiState::new();
    info!(
        "Controlling node at {} (poll every {:?}, reconnect {:?})",
        config.node_url, config.poll_interval, config.reconnect
    );

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut runner = EffectRunner {
        tx,
        search_handle: None,
    };

    let mut should_quit = runner.dispatch(&mut app, &mut tui, Action::Start);
    let mut needs_redraw = true;

    while !should_quit {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        // Process first event + drain all pending events before next draw
        let first_event = poll_event_timeout(EVENT_POLL_TIMEOUT);
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            needs_redraw = true;
            if let Some(action) = route_event(&event, &app, &mut tui) {
                should_quit |= runner.dispatch(&mut app, &mut tui, action);
            }
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            should_quit |= runner.dispatch(&mut app, &mut tui, action);
        }
    }

    if let Some(handle) = runner.search_handle.take() {
        handle.abort();
    }
    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Carries out effects. Holds the sender every spawned task reports through
/// and the handle of the running search so a new one can replace it.
struct EffectRunner {
    tx: mpsc::Sender<Action>,
    search_handle: Option<AbortHandle>,
}

impl EffectRunner {
    /// Applies an action and runs its effects. Returns true on quit.
    fn dispatch(&mut self, app: &mut App, tui: &mut TuiState, action: Action) -> bool {
        debug!("Dispatching {:?}", action);
        let mut quit = false;
        for effect in update(app, action) {
            quit |= self.execute(app, tui, effect);
        }
        quit
    }

    fn execute(&mut self, app: &App, tui: &mut TuiState, effect: Effect) -> bool {
        match effect {
            Effect::FetchSnapshot { generation } => {
                let client = app.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.snapshot().await.map_err(|e| e.to_string());
                    if let Err(e) = &result {
                        warn!("Tick {} failed: {}", generation, e);
                    }
                    send(&tx, Action::SnapshotLoaded { generation, result });
                });
            }
            Effect::ScheduleTick { timer_id, delay } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    send(&tx, Action::TimerFired(timer_id));
                });
            }
            Effect::RefreshTab { peer, ticket } => {
                let client = app.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client
                        .private_messages(&peer)
                        .await
                        .map_err(|e| e.to_string());
                    send(
                        &tx,
                        Action::PrivateMessagesLoaded {
                            peer,
                            ticket,
                            result,
                        },
                    );
                });
            }
            Effect::StartSearch { session_id, query } => {
                if let Some(handle) = self.search_handle.take() {
                    handle.abort();
                }
                tui.search_pane = ListPaneState::new();
                self.search_handle = Some(spawn_search(
                    app.client.clone(),
                    session_id,
                    query,
                    self.tx.clone(),
                ));
            }
            Effect::Run(command) => {
                let client = app.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = run_command(client.as_ref(), &command)
                        .await
                        .map_err(|e| e.to_string());
                    send(&tx, Action::CommandFinished { command, result });
                });
            }
            Effect::PinToBottom => tui.message_list(&app.view).pin_to_bottom(),
            Effect::Quit => return true,
        }
        false
    }
}

fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to send action: receiver dropped");
    }
}

/// Streams one search. Chunks are forwarded as they arrive; the finish
/// action is sent only after the last chunk went out.
fn spawn_search(
    client: Arc<dyn NodeClient>,
    session_id: u64,
    query: crate::node::SearchQuery,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!("Spawning search session {}", session_id);
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<String>(100);

    let handle = tokio::spawn(async move {
        let forward_tx = tx.clone();
        let forward = async move {
            let mut forwarded = 0usize;
            while let Some(chunk) = chunk_rx.recv().await {
                forwarded += chunk.len();
                send(&forward_tx, Action::SearchChunk { session_id, chunk });
            }
            forwarded
        };
        let (result, forwarded) = tokio::join!(client.search(&query, chunk_tx), forward);
        debug!(
            "Search session {} finished after {} bytes",
            session_id, forwarded
        );
        send(
            &tx,
            Action::SearchFinished {
                session_id,
                result: result.map_err(|e| e.to_string()),
            },
        );
    });
    handle.abort_handle()
}

/// Performs one mutating request. The returned string is detail for the
/// status line (saved path, upload reply).
async fn run_command(client: &dyn NodeClient, command: &Command) -> Result<String, NodeError> {
    match command {
        Command::Broadcast(content) => client.broadcast(content).await.map(|_| String::new()),
        Command::SendPrivate(message) => client.send_private(message).await.map(|_| String::new()),
        Command::TogglePeer { address, .. } => {
            client.toggle_peer(address).await.map(|_| String::new())
        }
        Command::Rename(name) => client.rename(name).await.map(|_| String::new()),
        Command::Download { request, dir } => {
            let contents = client.download(request).await?;
            let path = files::save_download(dir, &request.name, &contents).await?;
            Ok(path.display().to_string())
        }
        Command::Upload(path) => {
            let (file_name, contents) = files::read_upload(path).await?;
            let reply = client.upload(&file_name, contents).await?;
            Ok(reply.trim().to_string())
        }
    }
}
