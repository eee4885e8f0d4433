use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Global commands
    ForceQuit, // Ctrl+C
    Refresh,   // Ctrl+R: immediate tick / reconnect
    NextView,  // Ctrl+T
    CloseTab,  // Ctrl+W
    FocusNext, // Tab
    FocusPrev, // Shift+Tab
    Escape,

    // Editing and list navigation, interpreted by the focused pane
    Submit,
    InputChar(char),
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    CursorUp,
    CursorDown,

    // Message list scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key_event) => {
            // Kitty protocol reports releases too; act on presses only
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            map_key(key_event.modifiers, key_event.code)
        }
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(modifiers: KeyModifiers, code: KeyCode) -> Option<TuiEvent> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(TuiEvent::ForceQuit),
            KeyCode::Char('r') => Some(TuiEvent::Refresh),
            KeyCode::Char('t') => Some(TuiEvent::NextView),
            KeyCode::Char('w') => Some(TuiEvent::CloseTab),
            _ => None,
        };
    }
    match code {
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Tab => Some(TuiEvent::FocusNext),
        KeyCode::BackTab => Some(TuiEvent::FocusPrev),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
