//! # InputBox Component
//!
//! One line of text. What Enter does with it depends on the active view
//! (broadcast, private send, search) or on a leading `/` (a command); the
//! box only hands the text over.
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. The title is a prop so the
//! parent can say where the text will go and whether a send is in flight.
//! Lines wider than the box scroll horizontally so the cursor stays visible.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::state::View;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Left and right border.
const HORIZONTAL_OVERHEAD: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    pub title: String,
    pub focused: bool,
    /// Byte offset of the cursor; always on a char boundary.
    cursor: usize,
    /// Display column of the first visible character.
    scroll: usize,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Title describing where Enter sends the text.
pub fn title_for(view: &View, is_sending: bool) -> String {
    if is_sending {
        return "Sending…".to_string();
    }
    match view {
        View::Gossip => "Broadcast (/help for commands)".to_string(),
        View::Search => "Search keywords".to_string(),
        View::Peer(name) => format!("Private message to {name}"),
    }
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(s.len())
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            title: title_for(&View::Gossip, false),
            focused: true,
            cursor: 0,
            scroll: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Keeps the cursor column inside a window `width` columns wide.
    fn update_scroll(&mut self, width: usize) {
        if width == 0 {
            self.scroll = 0;
            return;
        }
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + width {
            self.scroll = column + 1 - width;
        }
    }

    /// The slice of the buffer starting at display column `self.scroll`.
    fn visible_text(&self, width: usize) -> String {
        let mut column = 0;
        let mut out = String::new();
        let mut used = 0;
        for c in self.buffer.chars() {
            let w = c.width().unwrap_or(0);
            if column >= self.scroll {
                if used + w > width {
                    break;
                }
                out.push(c);
                used += w;
            }
            column += w;
        }
        out
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        self.update_scroll(width);

        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.clone());

        let input = Paragraph::new(self.visible_text(width))
            .block(block)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(input, area);

        if self.focused {
            let x = area.x + 1 + (self.cursor_column() - self.scroll) as u16;
            frame.set_cursor_position((x, area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let flattened: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
