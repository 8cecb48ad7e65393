//! Input handling for the dashboard.
//!
//! Crossterm events are first normalized into [`InputEvent`]s. Keys are
//! then mapped to an [`Action`] by the [`InputHandler`]; global actions are
//! applied by the dashboard directly, the rest go to the focused panel.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Pointer buttons the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button.
    Primary,
    /// Right button.
    Secondary,
    /// Middle button.
    Middle,
}

impl From<MouseButton> for PointerButton {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::Primary,
            MouseButton::Right => Self::Secondary,
            MouseButton::Middle => Self::Middle,
        }
    }
}

/// A pointer event in terminal cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Motion, with or without a button held.
    Move {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// A button went down.
    Press {
        /// Which button.
        button: PointerButton,
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// A button went up.
    Release {
        /// Which button.
        button: PointerButton,
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
}

impl PointerEvent {
    /// Cell the event happened at.
    #[must_use]
    pub fn position(&self) -> (u16, u16) {
        match *self {
            Self::Move { x, y } | Self::Press { x, y, .. } | Self::Release { x, y, .. } => (x, y),
        }
    }
}

/// One event from the terminal, in the dashboard's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press (or auto-repeat).
    Key(KeyEvent),
    /// A pointer event.
    Pointer(PointerEvent),
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

impl InputEvent {
    /// Converts a crossterm event. Key releases, scrolling, focus and paste
    /// events have no counterpart and yield `None`.
    #[must_use]
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(Self::Key(key)),
            Event::Mouse(mouse) => Self::from_mouse(mouse).map(Self::Pointer),
            Event::Resize(width, height) => Some(Self::Resize { width, height }),
            _ => None,
        }
    }

    fn from_mouse(mouse: MouseEvent) -> Option<PointerEvent> {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(b) => Some(PointerEvent::Press { button: b.into(), x, y }),
            MouseEventKind::Up(b) => Some(PointerEvent::Release { button: b.into(), x, y }),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(PointerEvent::Move { x, y }),
            _ => None,
        }
    }
}

/// Input action resulting from a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Toggle the help overlay.
    Help,
    /// Switch to layout preset N.
    Preset(u8),
    /// Move the selection up one row.
    Up,
    /// Move the selection down one row.
    Down,
    /// Move the selection up one page.
    PageUp,
    /// Move the selection down one page.
    PageDown,
    /// Jump to the first row.
    Home,
    /// Jump to the last row.
    End,
    /// Cycle the sort column.
    CycleSort,
    /// No action.
    None,
}

impl Action {
    /// Global actions apply regardless of focus.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Quit | Self::Help | Self::Preset(_))
    }
}

/// Maps keys to actions, with optional vim keys.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Enable vim-style keys (j/k).
    pub vim_keys: bool,
}

impl InputHandler {
    /// Creates a new input handler.
    #[must_use]
    pub fn new(vim_keys: bool) -> Self {
        Self { vim_keys }
    }

    /// Handles a key event and returns the corresponding action.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> Action {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c' | 'q') => Action::Quit,
                _ => Action::None,
            };
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('?') | KeyCode::F(1) => Action::Help,
            KeyCode::Char(c @ '1'..='9') => {
                let digit = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
                digit.map_or(Action::None, Action::Preset)
            }

            KeyCode::Up => Action::Up,
            KeyCode::Down => Action::Down,
            KeyCode::Char('k') if self.vim_keys => Action::Up,
            KeyCode::Char('j') if self.vim_keys => Action::Down,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::Home => Action::Home,
            KeyCode::End => Action::End,
            KeyCode::Char('g') if self.vim_keys => Action::Home,
            KeyCode::Char('G') if self.vim_keys => Action::End,

            KeyCode::Char('s') => Action::CycleSort,

            _ => Action::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn key_event_ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::empty() })
    }

    #[test]
    fn test_quit_actions() {
        let handler = InputHandler::new(true);

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), Action::Quit);
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('c'))), Action::Quit);
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_ctrl_other_key_no_action() {
        let handler = InputHandler::new(true);
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('s'))), Action::None);
    }

    #[test]
    fn test_navigation() {
        let handler = InputHandler::new(true);

        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), Action::Up);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), Action::Down);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageDown)), Action::PageDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Home)), Action::Home);
        assert_eq!(handler.handle_key(key_event(KeyCode::End)), Action::End);
    }

    #[test]
    fn test_vim_keys() {
        let enabled = InputHandler::new(true);
        assert_eq!(enabled.handle_key(key_event(KeyCode::Char('k'))), Action::Up);
        assert_eq!(enabled.handle_key(key_event(KeyCode::Char('j'))), Action::Down);
        assert_eq!(enabled.handle_key(key_event(KeyCode::Char('G'))), Action::End);

        let disabled = InputHandler::new(false);
        assert_eq!(disabled.handle_key(key_event(KeyCode::Char('k'))), Action::None);
        assert_eq!(disabled.handle_key(key_event(KeyCode::Char('j'))), Action::None);
    }

    #[test]
    fn test_presets_and_help_are_global() {
        let handler = InputHandler::new(true);

        let preset = handler.handle_key(key_event(KeyCode::Char('2')));
        assert_eq!(preset, Action::Preset(2));
        assert!(preset.is_global());
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('0'))), Action::None);

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), Action::Help);
        assert!(Action::Help.is_global());
        assert!(!Action::Down.is_global());
        assert!(!Action::CycleSort.is_global());
    }

    #[test]
    fn test_sort_key() {
        let handler = InputHandler::default();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('s'))), Action::CycleSort);
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let handler = InputHandler::new(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), Action::None);
        assert_eq!(handler.handle_key(key_event(KeyCode::Insert)), Action::None);
    }

    #[test]
    fn test_from_crossterm_mouse() {
        let press =
            InputEvent::from_crossterm(mouse(MouseEventKind::Down(MouseButton::Left), 3, 4));
        assert_eq!(
            press,
            Some(InputEvent::Pointer(PointerEvent::Press {
                button: PointerButton::Primary,
                x: 3,
                y: 4
            }))
        );

        let release =
            InputEvent::from_crossterm(mouse(MouseEventKind::Up(MouseButton::Right), 1, 2));
        assert_eq!(
            release,
            Some(InputEvent::Pointer(PointerEvent::Release {
                button: PointerButton::Secondary,
                x: 1,
                y: 2
            }))
        );

        let drag = InputEvent::from_crossterm(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 6));
        assert_eq!(drag, Some(InputEvent::Pointer(PointerEvent::Move { x: 5, y: 6 })));

        assert_eq!(InputEvent::from_crossterm(mouse(MouseEventKind::ScrollDown, 0, 0)), None);
    }

    #[test]
    fn test_from_crossterm_key_and_resize() {
        let key = key_event(KeyCode::Char('q'));
        assert_eq!(InputEvent::from_crossterm(Event::Key(key)), Some(InputEvent::Key(key)));

        let mut released = key;
        released.kind = KeyEventKind::Release;
        assert_eq!(InputEvent::from_crossterm(Event::Key(released)), None);

        assert_eq!(
            InputEvent::from_crossterm(Event::Resize(120, 40)),
            Some(InputEvent::Resize { width: 120, height: 40 })
        );
        assert_eq!(InputEvent::from_crossterm(Event::FocusGained), None);
    }

    #[test]
    fn test_pointer_position() {
        let event = PointerEvent::Release { button: PointerButton::Middle, x: 9, y: 8 };
        assert_eq!(event.position(), (9, 8));
    }
}
