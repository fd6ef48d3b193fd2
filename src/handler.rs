use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_in_flight().await;
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work whether or not the chat is open
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.orchestrator.toggle_open();
            return;
        }
        _ => {}
    }

    if !app.orchestrator.is_open() {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Enter => app.orchestrator.toggle_open(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('s') if ctrl => app.summarize(),
        KeyCode::Char('g') if ctrl => app.generate_questions(),
        KeyCode::Char('f') if ctrl => app.features_collapsed = !app.features_collapsed,
        KeyCode::Enter => app.submit_input(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        _ => edit_input(app, key),
    }
}

fn edit_input(app: &mut App, key: KeyEvent) {
    // Input is disabled while a request is in flight
    if app.is_loading() {
        return;
    }

    match key.code {
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if app.cursor < app.input.chars().count() {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.cursor = (app.cursor + 1).min(app.input.chars().count());
        }
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.input.chars().count(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.orchestrator.is_open() {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(),
        MouseEventKind::ScrollDown => app.scroll_down(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_chat::{GeminiClient, KnowledgeDocument, Orchestrator};
    use std::sync::Arc;

    fn app() -> App {
        let client = Arc::new(GeminiClient::new("unused"));
        let orchestrator = Orchestrator::new(client, KnowledgeDocument::new("resume"));
        App::new(orchestrator, GeminiClient::DEFAULT_MODEL.to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_closed_chat_ignores_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::Esc);
        assert!(app.orchestrator.is_open());
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input, "x");
    }

    #[test]
    fn test_editing_with_cursor() {
        let mut app = app();
        press(&mut app, KeyCode::Enter); // opens
        for c in "helo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.input, "hello");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "ell");
    }

    #[test]
    fn test_blank_submit_keeps_input_and_transcript() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input, " ");
        assert!(app.orchestrator.transcript().is_empty());
        assert!(app.in_flight.is_none());
    }

    #[test]
    fn test_collapsed_features_disable_triggers() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        ctrl(&mut app, 'f');
        assert!(app.features_collapsed);

        ctrl(&mut app, 's');
        ctrl(&mut app, 'g');
        assert!(app.orchestrator.transcript().is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 10), s.len());
    }
}
