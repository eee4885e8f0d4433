use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};

use crate::core::search::{STARTED_TEXT, SearchEntry, SearchSession, SearchStatus};
use crate::tui::component::Component;
use crate::tui::components::list_pane::{ListPaneState, highlight_style, pane_block};

/// Body of the Search view. Enter on a downloadable entry fetches it.
pub struct SearchResults<'a> {
    pub state: &'a mut ListPaneState,
    pub session: Option<&'a SearchSession>,
    pub focused: bool,
}

pub fn block_title(session: &SearchSession) -> String {
    let budget = if session.budget == 0 {
        "auto".to_string()
    } else {
        session.budget.to_string()
    };
    let status = match &session.status {
        SearchStatus::Running => "running".to_string(),
        SearchStatus::Completed => "done".to_string(),
        SearchStatus::Failed(reason) => format!("failed: {reason}"),
    };
    format!(
        "Search \"{}\" · budget {budget} · {status}",
        session.keywords
    )
}

fn entry_item(entry: &SearchEntry) -> ListItem<'static> {
    match entry {
        SearchEntry::Info(text) => ListItem::new(Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        SearchEntry::Downloadable { name, hash } => ListItem::new(Line::from(vec![
            Span::styled("⇩ ", Style::default().fg(Color::Green)),
            Span::styled(name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {hash}"), Style::default().fg(Color::DarkGray)),
        ])),
    }
}

impl<'a> Component for SearchResults<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(session) = self.session else {
            self.state.sync_len(0);
            let hint = Paragraph::new(
                "Type keywords (comma separated) and press Enter, or /search <keywords> [budget].",
            )
            .style(Style::default().fg(Color::DarkGray))
            .block(pane_block("Search".to_string(), self.focused));
            frame.render_widget(hint, area);
            return;
        };

        self.state.sync_len(session.entries.len());
        if session.entries.is_empty() && session.is_running() {
            let started = Paragraph::new(STARTED_TEXT)
                .style(Style::default().fg(Color::DarkGray))
                .block(pane_block(block_title(session), self.focused));
            frame.render_widget(started, area);
            return;
        }

        let items: Vec<ListItem> = session.entries.iter().map(entry_item).collect();
        let list = List::new(items)
            .block(pane_block(block_title(session), self.focused))
            .highlight_style(highlight_style(self.focused));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
