use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::render::MessageRow;
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// The details line under the content.
const DETAILS_HEIGHT: u16 = 1;

/// A stateless component that renders one gossip or private message.
///
/// `Message` is a **transient component**: it's created fresh each frame from a
/// [`MessageRow`] and holds nothing between frames.
///
/// # Styling
///
/// - Our own messages are green and titled `name (you)`.
/// - Everyone else's are blue.
/// - The first message of an origin (`seq_id == 0`) gets a bold title.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap` options that match `Paragraph`'s wrapping, so the parent
/// list can lay out scroll positions without rendering anything.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub row: &'a MessageRow,
}

impl<'a> Message<'a> {
    pub fn new(row: &'a MessageRow) -> Self {
        Self { row }
    }

    pub fn calculate_height(row: &MessageRow, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = row.content.trim();
        let lines = if content.is_empty() {
            0
        } else {
            let options = textwrap::Options::new(content_width as usize)
                .break_words(true)
                .word_separator(textwrap::WordSeparator::AsciiSpace);
            textwrap::wrap(content, options).len() as u16
        };
        lines + DETAILS_HEIGHT + VERTICAL_OVERHEAD
    }
}

fn author_style(row: &MessageRow) -> Style {
    if row.is_self {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Blue)
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = author_style(self.row);
        let mut title_style = style;
        if self.row.is_origin {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }

        let title = if self.row.is_self {
            format!("{} (you)", self.row.author)
        } else {
            self.row.author.clone()
        };

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .title_style(title_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);

        let [content_area, details_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(DETAILS_HEIGHT)])
                .areas(inner);

        Paragraph::new(self.row.content.trim())
            .wrap(Wrap { trim: true })
            .render(content_area, buf);
        Paragraph::new(self.row.details())
            .style(Style::default().fg(Color::DarkGray))
            .render(details_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn make_row(content: &str, is_self: bool) -> MessageRow {
        MessageRow {
            author: "alice".to_string(),
            relay: "127.0.0.1:5000".to_string(),
            seq_id: 3,
            date: "2018-11-02".to_string(),
            content: content.to_string(),
            hash: "abcdef0123456789".to_string(),
            is_self,
            is_origin: false,
        }
    }

    #[test]
    fn calculate_height_empty_content_keeps_details_line() {
        let row = make_row("", false);
        assert_eq!(
            Message::calculate_height(&row, 80),
            DETAILS_HEIGHT + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let row = make_row("Hello world", false);
        assert_eq!(Message::calculate_height(&row, 0), 1);
        assert_eq!(Message::calculate_height(&row, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_wraps_at_width_boundary() {
        let row = make_row("Hello world", false);
        assert_eq!(Message::calculate_height(&row, 80), 1 + 3);
        assert_eq!(Message::calculate_height(&row, 9), 2 + 3);
    }

    #[test]
    fn calculate_height_breaks_long_words() {
        let row = make_row("abcdefghij", false);
        assert_eq!(Message::calculate_height(&row, 8), 3 + 3);
    }

    #[test]
    fn own_messages_are_green_and_marked() {
        assert_eq!(author_style(&make_row("x", true)).fg, Some(Color::Green));
        assert_eq!(author_style(&make_row("x", false)).fg, Some(Color::Blue));

        let row = make_row("hi there", true);
        let backend = TestBackend::new(60, Message::calculate_height(&row, 60));
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(Message::new(&row), f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("alice (you)"));
        assert!(text.contains("hi there"));
        assert!(text.contains("id 3"));
    }
}
