//! # TitleBar Component
//!
//! Top status line: who the node is, where it lives, whether we can reach
//! it, and the latest status message.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(
//!     app.identity.clone(),
//!     app.client.base_url().to_string(),
//!     app.connection.clone(),
//!     app.status_message.clone(),
//! );
//! title_bar.render(frame, area);
//! ```
//!
//! The identity shown here is the one from the last applied snapshot, so it
//! changes only when a whole tick lands.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::sync::ConnectionState;
use crate::tui::component::Component;

pub struct TitleBar {
    pub identity: String,
    pub node_url: String,
    pub connection: ConnectionState,
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        identity: String,
        node_url: String,
        connection: ConnectionState,
        status_message: String,
    ) -> Self {
        Self {
            identity,
            node_url,
            connection,
            status_message,
            has_unseen_content: false,
        }
    }

    fn connection_style(&self) -> Style {
        match self.connection {
            ConnectionState::Connecting => Style::default().fg(Color::Yellow),
            ConnectionState::Connected => Style::default().fg(Color::Green),
            ConnectionState::Disconnected { .. } => {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            }
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let name = if self.identity.is_empty() {
            "?"
        } else {
            self.identity.as_str()
        };

        let mut spans = vec![
            Span::styled("peerdeck ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{name} @ {} ", self.node_url)),
            Span::styled(format!("[{}]", self.connection.label()), self.connection_style()),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | ↓ New"));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
