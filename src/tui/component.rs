use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive data via props (struct fields), may hold a
/// `&mut` reference to persistent state, and render into a `Rect`.
///
/// `render` takes `&mut self` so a component can update its state while
/// drawing (layout caches, scroll offsets, selection clamping), in the
/// manner of ratatui's `StatefulWidget`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
