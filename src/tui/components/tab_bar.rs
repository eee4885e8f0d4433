//! Tab strip: `1 Gossip │ Search │ 2 alice │ 3 bob`.
//!
//! Peer tabs carry their ordinal. Ordinals are never reused, so after closing
//! tab 2 the next tab is still 4, not 2.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Tabs;

use crate::core::state::View;
use crate::core::tabs::PRIMARY_TAB_ORDINAL;
use crate::tui::component::Component;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub view: View,
    pub ordinal: Option<u64>,
    /// Search still running / conversation not loaded yet.
    pub busy: bool,
}

impl TabLabel {
    fn text(&self) -> String {
        let mut text = match self.ordinal {
            Some(n) => format!("{n} {}", self.view.title()),
            None => self.view.title(),
        };
        if self.busy {
            text.push('…');
        }
        text
    }
}

pub struct TabBar {
    pub labels: Vec<TabLabel>,
    pub active: View,
}

impl TabBar {
    pub fn from_app(app: &crate::core::state::App) -> Self {
        let mut labels = vec![
            TabLabel {
                view: View::Gossip,
                ordinal: Some(PRIMARY_TAB_ORDINAL),
                busy: false,
            },
            TabLabel {
                view: View::Search,
                ordinal: None,
                busy: app.search.session().is_some_and(|s| s.is_running()),
            },
        ];
        labels.extend(app.tabs.ordered().into_iter().map(|tab| TabLabel {
            view: View::Peer(tab.peer_name.clone()),
            ordinal: Some(tab.tab_id),
            busy: !tab.loaded,
        }));
        Self {
            labels,
            active: app.view.clone(),
        }
    }
}

impl Component for TabBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let selected = self
            .labels
            .iter()
            .position(|l| l.view == self.active)
            .unwrap_or(0);
        let tabs = Tabs::new(self.labels.iter().map(|l| Line::from(l.text())))
            .select(selected)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("│");
        frame.render_widget(tabs, area);
    }
}
