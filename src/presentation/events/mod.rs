//! Event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

/// Rows moved per mouse wheel notch.
pub const WHEEL_ROWS: u32 = 3;

/// Result of event handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue processing.
    Continue,
    /// Exit application.
    Exit,
}

/// What a key or mouse event asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Quit,
    /// Scroll up by the given number of rows.
    ScrollUp(u32),
    /// Scroll down by the given number of rows.
    ScrollDown(u32),
    PageUp,
    PageDown,
    Top,
    Bottom,
    NextGroup,
    PreviousGroup,
    Reload,
}

/// Maps terminal input to viewer actions.
pub struct EventHandler;

impl EventHandler {
    /// Checks if key is a quit event.
    #[must_use]
    pub fn is_quit_event(key: &KeyEvent) -> bool {
        matches!(
            key,
            KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::NONE,
                ..
            } | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } | KeyEvent {
                code: KeyCode::Esc,
                modifiers: KeyModifiers::NONE,
                ..
            }
        )
    }

    /// Translates a key press. Releases and repeats reported by some
    /// terminals are ignored.
    #[must_use]
    pub fn key_action(key: &KeyEvent) -> Option<ViewerAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if Self::is_quit_event(key) {
            return Some(ViewerAction::Quit);
        }

        let action = match (key.code, key.modifiers) {
            (KeyCode::Char('k') | KeyCode::Up, KeyModifiers::NONE) => ViewerAction::ScrollUp(1),
            (KeyCode::Char('j') | KeyCode::Down, KeyModifiers::NONE) => {
                ViewerAction::ScrollDown(1)
            }
            (KeyCode::PageUp, _) => ViewerAction::PageUp,
            (KeyCode::PageDown, _) => ViewerAction::PageDown,
            (KeyCode::Char('g') | KeyCode::Home, KeyModifiers::NONE) => ViewerAction::Top,
            (KeyCode::Char('G'), _) | (KeyCode::End, KeyModifiers::NONE) => ViewerAction::Bottom,
            (KeyCode::Tab, KeyModifiers::NONE) => ViewerAction::NextGroup,
            (KeyCode::BackTab, _) => ViewerAction::PreviousGroup,
            (KeyCode::Char('r'), KeyModifiers::NONE) => ViewerAction::Reload,
            _ => return None,
        };
        Some(action)
    }

    /// Translates mouse wheel movement.
    #[must_use]
    pub const fn mouse_action(mouse: &MouseEvent) -> Option<ViewerAction> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(ViewerAction::ScrollUp(WHEEL_ROWS)),
            MouseEventKind::ScrollDown => Some(ViewerAction::ScrollDown(WHEEL_ROWS)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use test_case::test_case;

    fn make_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn test_quit_events() {
        assert!(EventHandler::is_quit_event(&make_key_event(
            KeyCode::Char('q'),
            KeyModifiers::NONE
        )));
        assert!(EventHandler::is_quit_event(&make_key_event(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(EventHandler::is_quit_event(&make_key_event(
            KeyCode::Esc,
            KeyModifiers::NONE
        )));
        assert!(!EventHandler::is_quit_event(&make_key_event(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
    }

    #[test_case(KeyCode::Char('k'), KeyModifiers::NONE, ViewerAction::ScrollUp(1))]
    #[test_case(KeyCode::Down, KeyModifiers::NONE, ViewerAction::ScrollDown(1))]
    #[test_case(KeyCode::PageUp, KeyModifiers::NONE, ViewerAction::PageUp)]
    #[test_case(KeyCode::Home, KeyModifiers::NONE, ViewerAction::Top)]
    #[test_case(KeyCode::Char('G'), KeyModifiers::SHIFT, ViewerAction::Bottom)]
    #[test_case(KeyCode::End, KeyModifiers::NONE, ViewerAction::Bottom)]
    #[test_case(KeyCode::Tab, KeyModifiers::NONE, ViewerAction::NextGroup)]
    #[test_case(KeyCode::BackTab, KeyModifiers::SHIFT, ViewerAction::PreviousGroup)]
    #[test_case(KeyCode::Char('r'), KeyModifiers::NONE, ViewerAction::Reload)]
    #[test_case(KeyCode::Char('q'), KeyModifiers::NONE, ViewerAction::Quit)]
    fn test_key_actions(code: KeyCode, modifiers: KeyModifiers, expected: ViewerAction) {
        assert_eq!(
            EventHandler::key_action(&make_key_event(code, modifiers)),
            Some(expected)
        );
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(
            EventHandler::key_action(&make_key_event(KeyCode::Char('x'), KeyModifiers::NONE)),
            None
        );
    }

    #[test_case(KeyEventKind::Release ; "release")]
    #[test_case(KeyEventKind::Repeat ; "repeat")]
    fn test_non_press_kinds_ignored(kind: KeyEventKind) {
        let key = KeyEvent::new_with_kind(KeyCode::Char('j'), KeyModifiers::NONE, kind);
        assert_eq!(EventHandler::key_action(&key), None);

        let quit = KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, kind);
        assert_eq!(EventHandler::key_action(&quit), None);
    }

    #[test]
    fn test_mouse_wheel() {
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            EventHandler::mouse_action(&wheel),
            Some(ViewerAction::ScrollUp(WHEEL_ROWS))
        );

        let click = MouseEvent {
            kind: MouseEventKind::Moved,
            ..wheel
        };
        assert_eq!(EventHandler::mouse_action(&click), None);
    }
}
