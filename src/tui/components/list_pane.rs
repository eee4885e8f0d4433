//! Selection state shared by the sidebar lists and the search results.
//!
//! The lists themselves are rebuilt every frame from the latest snapshot, so
//! the state only remembers a cursor and how many rows it last saw. Rows can
//! vanish between ticks; the cursor is clamped on every render.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, ListState};

use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

/// Bordered frame for a pane; the focused one gets a bright border.
pub fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::bordered()
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
}

/// Highlight for the cursor row. Only drawn while the pane has focus.
pub fn highlight_style(focused: bool) -> Style {
    if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPaneEvent {
    /// Enter on a row.
    Activate(usize),
    /// Delete (or `d`) on a row.
    Delete(usize),
}

#[derive(Debug, Default)]
pub struct ListPaneState {
    pub list_state: ListState,
    item_count: usize,
}

impl ListPaneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the renderer with the current row count.
    pub fn sync_len(&mut self, item_count: usize) {
        self.item_count = item_count;
        if item_count == 0 {
            self.list_state.select(None);
            return;
        }
        match self.list_state.selected() {
            Some(i) if i >= item_count => self.list_state.select(Some(item_count - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected().filter(|&i| i < self.item_count)
    }

    fn move_by(&mut self, delta: isize) {
        if self.item_count == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, self.item_count as isize - 1);
        self.list_state.select(Some(next as usize));
    }
}

impl EventHandler for ListPaneState {
    type Event = ListPaneEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::CursorUp | TuiEvent::ScrollUp => {
                self.move_by(-1);
                None
            }
            TuiEvent::CursorDown | TuiEvent::ScrollDown => {
                self.move_by(1);
                None
            }
            TuiEvent::CursorHome => {
                self.move_by(isize::MIN / 2);
                None
            }
            TuiEvent::CursorEnd => {
                self.move_by(isize::MAX / 2);
                None
            }
            TuiEvent::Submit => self.selected().map(ListPaneEvent::Activate),
            TuiEvent::Delete | TuiEvent::InputChar('d') => {
                self.selected().map(ListPaneEvent::Delete)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_is_clamped() {
        let mut state = ListPaneState::new();
        state.sync_len(3);
        assert_eq!(state.selected(), Some(0));

        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.selected(), Some(0));
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected(), Some(2));
        state.handle_event(&TuiEvent::CursorHome);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_shrinking_list_moves_cursor() {
        let mut state = ListPaneState::new();
        state.sync_len(5);
        state.handle_event(&TuiEvent::CursorEnd);
        assert_eq!(state.selected(), Some(4));

        state.sync_len(2);
        assert_eq!(state.selected(), Some(1));
        state.sync_len(0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_activate_and_delete() {
        let mut state = ListPaneState::new();
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);

        state.sync_len(2);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ListPaneEvent::Activate(1))
        );
        assert_eq!(
            state.handle_event(&TuiEvent::InputChar('d')),
            Some(ListPaneEvent::Delete(1))
        );
        assert_eq!(state.handle_event(&TuiEvent::InputChar('x')), None);
    }
}
