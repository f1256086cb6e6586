use ratatui_caret_core::input::CaretEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyKind {
    #[default]
    Press,
    Release,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub kind: KeyKind,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::none(),
            kind: KeyKind::Press,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn released(mut self) -> Self {
        self.kind = KeyKind::Release;
        self
    }
}

/// A mouse press in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseDown {
    pub x: u16,
    pub y: u16,
}

/// Terminal input, decoupled from any backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
    MouseDown(MouseDown),
    Resize { width: u16, height: u16 },
    FocusGained,
    FocusLost,
}

impl InputEvent {
    /// The caret event a field should see for this input, if any.
    ///
    /// Key presses map to `KeyDown` so the caret re-reads the cursor after the field has applied
    /// the key; most terminals never report releases.
    pub fn caret_event(&self) -> Option<CaretEvent> {
        match self {
            InputEvent::Key(key) => Some(match key.kind {
                KeyKind::Press => CaretEvent::KeyDown,
                KeyKind::Release => CaretEvent::KeyUp,
            }),
            InputEvent::Paste(_) => Some(CaretEvent::Input),
            InputEvent::MouseDown(_) => Some(CaretEvent::Click),
            InputEvent::Resize { .. } => Some(CaretEvent::Resize),
            InputEvent::FocusGained => Some(CaretEvent::Focus),
            InputEvent::FocusLost => Some(CaretEvent::Blur),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_defer_and_releases_recompute() {
        let press = InputEvent::Key(KeyEvent::new(KeyCode::Char('a')));
        assert_eq!(press.caret_event(), Some(CaretEvent::KeyDown));
        let release = InputEvent::Key(KeyEvent::new(KeyCode::Char('a')).released());
        assert_eq!(release.caret_event(), Some(CaretEvent::KeyUp));
    }

    #[test]
    fn terminal_events_map_to_caret_events() {
        assert_eq!(
            InputEvent::Paste("x".into()).caret_event(),
            Some(CaretEvent::Input)
        );
        assert_eq!(
            InputEvent::MouseDown(MouseDown { x: 1, y: 2 }).caret_event(),
            Some(CaretEvent::Click)
        );
        assert_eq!(
            InputEvent::Resize {
                width: 80,
                height: 24
            }
            .caret_event(),
            Some(CaretEvent::Resize)
        );
        assert_eq!(InputEvent::FocusLost.caret_event(), Some(CaretEvent::Blur));
    }
}
