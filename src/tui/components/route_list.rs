use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem};

use crate::core::render::RouteRow;
use crate::tui::component::Component;
use crate::tui::components::list_pane::{ListPaneState, highlight_style, pane_block};

/// Sidebar list of reachable origins. Enter opens (or focuses) a private
/// conversation with the origin; `•` marks origins with an open tab.
pub struct RouteList<'a> {
    pub state: &'a mut ListPaneState,
    pub rows: &'a [RouteRow],
    pub focused: bool,
}

impl<'a> Component for RouteList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync_len(self.rows.len());

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let marker = if row.has_tab { "• " } else { "  " };
                let mut spans = vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(
                        row.origin.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ];
                if !row.via.is_empty() {
                    spans.push(Span::styled(
                        format!(" ({})", row.via),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(pane_block(format!("Routes ({})", self.rows.len()), self.focused))
            .highlight_style(highlight_style(self.focused));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
