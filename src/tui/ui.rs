use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::core::render::{render_messages, render_peers, render_routes};
use crate::core::state::{App, View};
use crate::core::sync::{ConnectionState, ReconnectPolicy};
use crate::tui::component::Component;
use crate::tui::components::input_box::title_for;
use crate::tui::components::{MessageList, PeerList, RouteList, SearchResults, TabBar, TitleBar};
use crate::tui::{Focus, TuiState};

/// Width of the peers/routes column.
const SIDEBAR_WIDTH: u16 = 34;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, tabs_area, body_area, input_area] =
        Layout::vertical([Length(1), Length(1), Min(0), Length(3)]).areas(frame.area());

    TabBar::from_app(app).render(frame, tabs_area);
    tui.forget_closed_views(app);

    // Body: error view while disconnected, the working panel otherwise
    match &app.connection {
        ConnectionState::Disconnected { reason } => {
            draw_error_view(frame, body_area, reason, app.reconnect);
        }
        _ => draw_body(frame, body_area, app, tui),
    }

    let mut title_bar = TitleBar::new(
        app.identity.clone(),
        app.client.base_url().to_string(),
        app.connection.clone(),
        app.status_message.clone(),
    );
    title_bar.has_unseen_content = tui.has_unseen_content(&app.view);
    title_bar.render(frame, title_area);

    tui.input_box.title = title_for(&app.view, app.is_sending);
    tui.input_box.focused = tui.focus == Focus::Input;
    tui.input_box.render(frame, input_area);
}

fn draw_body(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min, Percentage};
    let [main_area, sidebar_area] =
        Layout::horizontal([Min(0), Length(SIDEBAR_WIDTH)]).areas(area);
    let [peers_area, routes_area] =
        Layout::vertical([Percentage(40), Percentage(60)]).areas(sidebar_area);

    match &app.view {
        View::Search => {
            SearchResults {
                state: &mut tui.search_pane,
                session: app.search.session(),
                focused: tui.focus == Focus::Search,
            }
            .render(frame, main_area);
        }
        view => {
            let placeholder = match view {
                View::Peer(name) if app.tabs.get(name).is_some_and(|t| !t.loaded) => {
                    "Loading conversation…"
                }
                View::Peer(_) => "No private messages yet",
                _ => "No messages yet",
            };
            let rows = render_messages(app.visible_messages(), &app.identity);
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(view.title());
            let inner = block.inner(main_area);
            frame.render_widget(block, main_area);
            MessageList::new(tui.message_list(view), &rows, placeholder).render(frame, inner);
        }
    }

    let peer_rows = render_peers(&app.peers);
    PeerList {
        state: &mut tui.peer_pane,
        rows: &peer_rows,
        focused: tui.focus == Focus::Peers,
    }
    .render(frame, peers_area);

    let route_rows = render_routes(&app.routes, |origin| app.tabs.contains(origin));
    RouteList {
        state: &mut tui.route_pane,
        rows: &route_rows,
        focused: tui.focus == Focus::Routes,
    }
    .render(frame, routes_area);
}

fn draw_error_view(frame: &mut Frame, area: Rect, reason: &str, policy: ReconnectPolicy) {
    let hint = match policy {
        ReconnectPolicy::Auto => "Retrying on the next tick. Ctrl+R retries now.",
        ReconnectPolicy::Manual => "Press Ctrl+R to reconnect.",
    };
    let text = vec![
        Line::from(Span::styled(
            "Cannot reach the node",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(reason.to_string()),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    let error_paragraph = Paragraph::new(text)
        .block(Block::bordered().title("ERROR"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error_paragraph, area);
}
