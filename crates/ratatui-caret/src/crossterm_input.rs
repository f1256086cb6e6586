use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyKind;
use crate::input::KeyModifiers;
use crate::input::MouseDown;

/// Maps a crossterm event to the subset the fields and caret overlays care about.
///
/// Mouse moves, drags and scroll wheel events are dropped; only button presses place the cursor.
pub fn input_event_from_crossterm(ev: crossterm::event::Event) -> Option<InputEvent> {
    match ev {
        crossterm::event::Event::Key(key) => Some(InputEvent::Key(key_event_from_crossterm(key)?)),
        crossterm::event::Event::Paste(s) => Some(InputEvent::Paste(s)),
        crossterm::event::Event::Mouse(m) => match m.kind {
            crossterm::event::MouseEventKind::Down(_) => Some(InputEvent::MouseDown(MouseDown {
                x: m.column,
                y: m.row,
            })),
            _ => None,
        },
        crossterm::event::Event::Resize(width, height) => {
            Some(InputEvent::Resize { width, height })
        }
        crossterm::event::Event::FocusGained => Some(InputEvent::FocusGained),
        crossterm::event::Event::FocusLost => Some(InputEvent::FocusLost),
    }
}

/// Auto-repeat counts as a press so held keys keep moving the caret.
pub fn key_event_from_crossterm(key: crossterm::event::KeyEvent) -> Option<KeyEvent> {
    let kind = match key.kind {
        crossterm::event::KeyEventKind::Press | crossterm::event::KeyEventKind::Repeat => {
            KeyKind::Press
        }
        crossterm::event::KeyEventKind::Release => KeyKind::Release,
    };
    let code = match key.code {
        crossterm::event::KeyCode::Char(c) => KeyCode::Char(c),
        crossterm::event::KeyCode::Enter => KeyCode::Enter,
        crossterm::event::KeyCode::Backspace => KeyCode::Backspace,
        crossterm::event::KeyCode::Delete => KeyCode::Delete,
        crossterm::event::KeyCode::Tab => KeyCode::Tab,
        crossterm::event::KeyCode::BackTab => KeyCode::BackTab,
        crossterm::event::KeyCode::Esc => KeyCode::Esc,
        crossterm::event::KeyCode::Left => KeyCode::Left,
        crossterm::event::KeyCode::Right => KeyCode::Right,
        crossterm::event::KeyCode::Up => KeyCode::Up,
        crossterm::event::KeyCode::Down => KeyCode::Down,
        crossterm::event::KeyCode::Home => KeyCode::Home,
        crossterm::event::KeyCode::End => KeyCode::End,
        _ => return None,
    };

    Some(KeyEvent {
        code,
        modifiers: modifiers_from_crossterm(key.modifiers),
        kind,
    })
}

fn modifiers_from_crossterm(m: crossterm::event::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: m.contains(crossterm::event::KeyModifiers::SHIFT),
        ctrl: m.contains(crossterm::event::KeyModifiers::CONTROL),
        alt: m.contains(crossterm::event::KeyModifiers::ALT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui_caret_core::input::CaretEvent;

    #[test]
    fn mouse_press_becomes_a_click() {
        let ev = crossterm::event::Event::Mouse(crossterm::event::MouseEvent {
            kind: crossterm::event::MouseEventKind::Down(crossterm::event::MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: crossterm::event::KeyModifiers::NONE,
        });
        let input = input_event_from_crossterm(ev).unwrap();
        assert_eq!(input, InputEvent::MouseDown(MouseDown { x: 3, y: 4 }));
        assert_eq!(input.caret_event(), Some(CaretEvent::Click));
    }

    #[test]
    fn key_release_is_kept() {
        let key = crossterm::event::KeyEvent::new_with_kind(
            crossterm::event::KeyCode::Left,
            crossterm::event::KeyModifiers::SHIFT,
            crossterm::event::KeyEventKind::Release,
        );
        let ev = key_event_from_crossterm(key).unwrap();
        assert_eq!(ev.kind, KeyKind::Release);
        assert!(ev.modifiers.shift);
    }

    #[test]
    fn focus_and_resize_pass_through() {
        assert_eq!(
            input_event_from_crossterm(crossterm::event::Event::FocusLost),
            Some(InputEvent::FocusLost)
        );
        assert_eq!(
            input_event_from_crossterm(crossterm::event::Event::Resize(100, 30)),
            Some(InputEvent::Resize {
                width: 100,
                height: 30
            })
        );
    }
}
