use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem};

use crate::core::render::PeerRow;
use crate::tui::component::Component;
use crate::tui::components::list_pane::{ListPaneState, highlight_style, pane_block};

/// Sidebar list of direct peers. Delete on a row drops that peer.
pub struct PeerList<'a> {
    pub state: &'a mut ListPaneState,
    pub rows: &'a [PeerRow],
    pub focused: bool,
}

impl<'a> Component for PeerList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync_len(self.rows.len());

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                ListItem::new(Line::from(vec![
                    Span::raw(row.address.clone()),
                    Span::styled(
                        format!(" {}", row.kind_label),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(pane_block(format!("Peers ({})", self.rows.len()), self.focused))
            .highlight_style(highlight_style(self.focused));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_renders_peers_with_kind() {
        let rows = vec![
            PeerRow {
                address: "127.0.0.1:5001".into(),
                kind_label: "manual",
            },
            PeerRow {
                address: "127.0.0.1:5002".into(),
                kind_label: "learned",
            },
        ];
        let mut state = ListPaneState::new();
        let backend = TestBackend::new(32, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                PeerList {
                    state: &mut state,
                    rows: &rows,
                    focused: true,
                }
                .render(f, f.area())
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Peers (2)"));
        assert!(text.contains("127.0.0.1:5001 manual"));
        assert!(text.contains("learned"));
        assert_eq!(state.selected(), Some(0));
    }
}
