use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use tui_textarea::Key;

use super::from_crossterm;
use crate::domain::models::Event;

fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
    return CrosstermEvent::Key(KeyEvent::new(code, modifiers));
}

#[test]
fn it_maps_hotkeys() {
    assert!(matches!(
        from_crossterm(key(KeyCode::Char('o'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCTRLO())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCTRLT())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Char('y'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCTRLY())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCTRLC())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Enter, KeyModifiers::NONE)),
        Some(Event::KeyboardEnter())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Esc, KeyModifiers::NONE)),
        Some(Event::KeyboardEsc())
    ));
}

#[test]
fn it_maps_scrolling() {
    assert!(matches!(
        from_crossterm(key(KeyCode::Up, KeyModifiers::NONE)),
        Some(Event::UIScrollUp())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::PageDown, KeyModifiers::NONE)),
        Some(Event::UIScrollPageDown())
    ));
    assert!(matches!(
        from_crossterm(key(KeyCode::Char('u'), KeyModifiers::CONTROL)),
        Some(Event::UIScrollPageUp())
    ));
    assert!(matches!(
        from_crossterm(CrosstermEvent::Resize(80, 24)),
        Some(Event::UIResize())
    ));
}

#[test]
fn it_passes_through_text_input() {
    match from_crossterm(key(KeyCode::Char('o'), KeyModifiers::NONE)) {
        Some(Event::KeyboardCharInput(input)) => {
            assert!(matches!(input.key, Key::Char('o')));
            assert!(!input.ctrl);
        }
        _ => panic!("Expected character input"),
    }

    assert!(matches!(
        from_crossterm(CrosstermEvent::Paste("abc".to_string())),
        Some(Event::KeyboardPaste(text)) if text == "abc"
    ));
}

#[test]
fn it_ignores_key_releases() {
    let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    assert!(from_crossterm(CrosstermEvent::Key(release)).is_none());
}
