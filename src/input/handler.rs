use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::game::Control;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Control(Control),
    /// Mouse is over this terminal cell
    Pointer { column: u16, row: u16 },
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_event(&self, event: &Event) -> InputAction {
        match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(*key),
            Event::Mouse(mouse) => self.handle_mouse_event(*mouse),
            _ => InputAction::None,
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> InputAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return InputAction::Control(Control::Quit);
        }

        match key.code {
            KeyCode::Char(' ') => InputAction::Control(Control::StartOrPause),
            KeyCode::Char('r') | KeyCode::Char('R') => InputAction::Control(Control::Restart),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                InputAction::Control(Control::Quit)
            }
            _ => InputAction::None,
        }
    }

    /// Any mouse activity that reports a location moves the pointer
    pub fn handle_mouse_event(&self, mouse: MouseEvent) -> InputAction {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                InputAction::Pointer {
                    column: mouse.column,
                    row: mouse.row,
                }
            }
            _ => InputAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
