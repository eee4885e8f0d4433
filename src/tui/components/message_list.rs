//! # MessageList Component
//!
//! Scrollable view of the gossip feed or of one private conversation.
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the rows to draw (props).
//!
//! Every tick replaces the feed wholesale, so the layout cache is keyed by a
//! per-row fingerprint instead of a count: heights are reused for the longest
//! prefix of rows that did not change.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::render::MessageRow;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

/// Persistent scroll and layout state, owned by `TuiState`.
///
/// Offsets are absolute rows into the whole feed. A long-running node can
/// gossip more rows than a `u16` holds, so only the window around the
/// viewport is handed to the `ScrollView`.
pub struct MessageListState {
    /// First feed row shown at the top of the viewport.
    pub offset: u32,
    pub layout: LayoutCache,
    /// Follow new messages as they arrive.
    pub stick_to_bottom: bool,
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u32 {
        self.layout
            .total_height()
            .saturating_sub(u32::from(self.viewport_height))
    }

    pub fn clamp_scroll(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    /// Re-attaches to the bottom if a scroll landed there.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.offset >= max_y {
            self.stick_to_bottom = true;
            self.offset = max_y;
        }
    }

    /// Jumps to the newest message and follows from there.
    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.offset = self.max_offset();
    }

    /// Whether rows exist below the viewport while we're detached.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.offset < self.max_offset()
    }

    fn page(&self) -> u32 {
        u32::from(self.viewport_height.max(1))
    }
}

pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub rows: &'a [MessageRow],
    /// Shown when `rows` is empty.
    pub placeholder: &'a str,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, rows: &'a [MessageRow], placeholder: &'a str) -> Self {
        Self {
            state,
            rows,
            placeholder,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.rows.is_empty() {
            self.state.layout.clear();
            self.state.offset = 0;
            frame.render_widget(
                Paragraph::new(self.placeholder).style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar

        // 1. Update the layout cache
        let layout = &mut self.state.layout;
        let keys: Vec<u64> = self.rows.iter().map(row_key).collect();
        let reusable = layout.reusable_count(&keys, content_width);
        layout.heights.truncate(reusable);
        for row in &self.rows[reusable..] {
            layout.heights.push(Message::calculate_height(row, content_width));
        }
        layout.keys = keys;
        layout.content_width = content_width;
        layout.rebuild_prefix_heights();

        // 2. Clamp scroll offset to the content
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.offset = self.state.max_offset();
        } else {
            self.state.clamp_scroll();
        }

        let offset = self.state.offset;
        let layout = &self.state.layout;
        let window = layout.visible_range(offset, area.height);
        let window_top = layout.row_top(window.start);
        let window_height =
            u16::try_from(layout.row_top(window.end).saturating_sub(window_top)).unwrap_or(u16::MAX);

        // 3. Render the window's rows into a ScrollView sized to the window
        let mut scroll_view = ScrollView::new(Size::new(content_width, window_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Never)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in window {
            let Ok(y) = u16::try_from(layout.row_top(i).saturating_sub(window_top)) else {
                break;
            };
            let height = layout.heights[i].min(window_height.saturating_sub(y));
            if height == 0 {
                break;
            }
            let rect = Rect::new(0, y, content_width, height);
            scroll_view.render_widget(Message::new(&self.rows[i]), rect);
        }

        let mut window_state = ScrollViewState::default();
        window_state.set_offset(Position {
            x: 0,
            y: u16::try_from(offset.saturating_sub(window_top)).unwrap_or(u16::MAX),
        });
        frame.render_stateful_widget(scroll_view, area, &mut window_state);

        // 4. Scrollbar reflects the whole feed, not the window
        let mut scrollbar_state = ScrollbarState::new(self.state.max_offset() as usize + 1)
            .position(offset as usize)
            .viewport_content_length(usize::from(area.height));
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.offset = self.offset.saturating_sub(1);
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.offset = self.offset.saturating_add(1);
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.offset = self.offset.saturating_sub(self.page());
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.offset = self.offset.saturating_add(self.page());
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

fn row_key(row: &MessageRow) -> u64 {
    let mut hasher = DefaultHasher::new();
    row.hash(&mut hasher);
    hasher.finish()
}

/// Cached per-row heights plus the fingerprints they were computed for.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// Cumulative bottom edge of each row.
    pub prefix_heights: Vec<u32>,
    keys: Vec<u64>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            keys: Vec::new(),
            content_width: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn total_height(&self) -> u32 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top edge of row `index`; `index == len` gives the bottom of the feed.
    pub fn row_top(&self, index: usize) -> u32 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(self.total_height()),
        }
    }

    /// Number of leading heights still valid for `keys` at `content_width`.
    pub fn reusable_count(&self, keys: &[u64], content_width: u16) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        self.keys
            .iter()
            .zip(keys)
            .take(self.heights.len())
            .take_while(|(cached, new)| cached == new)
            .count()
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u32, |acc, &h| {
                *acc = acc.saturating_add(u32::from(h));
                Some(*acc)
            })
            .collect();
    }

    /// Rows intersecting the viewport, with half a screen of slack each way.
    pub fn visible_range(&self, scroll_offset: u32, viewport_height: u16) -> Range<usize> {
        let viewport_height = u32::from(viewport_height);
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
