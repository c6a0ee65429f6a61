use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

const CHAT_SCROLL_STEP: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
}

/// Plain character input: no Control/Alt chord attached.
fn is_text_input(key: &KeyEvent) -> bool {
    !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('k') => {
                app.toggle_assist();
                return;
            }
            KeyCode::Char('t') => {
                app.begin_title_edit();
                return;
            }
            _ => {}
        }
    }

    match app.focus {
        Focus::Editor => handle_editor_key(app, key),
        Focus::Title => handle_title_key(app, key),
        Focus::Assist => handle_assist_key(app, key),
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    let doc = &mut app.document;
    match key.code {
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => doc.insert_newline(),
        KeyCode::Backspace => doc.backspace(),
        KeyCode::Delete => doc.delete(),
        KeyCode::Left => doc.move_left(),
        KeyCode::Right => doc.move_right(),
        KeyCode::Up => doc.move_up(),
        KeyCode::Down => doc.move_down(),
        KeyCode::Home => doc.move_home(),
        KeyCode::End => doc.move_end(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Char(c) if is_text_input(&key) => doc.insert_char(c),
        _ => {}
    }
    app.ensure_cursor_visible();
}

fn handle_title_key(app: &mut App, key: KeyEvent) {
    let input = &mut app.title_input;
    match key.code {
        KeyCode::Enter => app.commit_title(),
        KeyCode::Esc => app.cancel_title(),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) if is_text_input(&key) => input.insert(c),
        _ => {}
    }
}

fn handle_assist_key(app: &mut App, key: KeyEvent) {
    let input = app.session.input_mut();
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => {
            // Dropped silently when blank or while a reply is pending
            app.submit_assist();
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1)),
        KeyCode::Char(c) if is_text_input(&key) => input.insert(c),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    match app.focus {
        Focus::Editor => {
            // Terminals send CRLF line endings in pastes
            app.document.insert_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
            app.ensure_cursor_visible();
        }
        Focus::Title => app.title_input.insert_str(&single_line(text)),
        Focus::Assist => app.session.input_mut().insert_str(&single_line(text)),
    }
}

fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_editor = app.editor_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_chat = app.assist_open && app.chat_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(CHAT_SCROLL_STEP);
            } else if in_editor {
                for _ in 0..CHAT_SCROLL_STEP {
                    app.document.move_down();
                }
                app.ensure_cursor_visible();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(CHAT_SCROLL_STEP);
            } else if in_editor {
                for _ in 0..CHAT_SCROLL_STEP {
                    app.document.move_up();
                }
                app.ensure_cursor_visible();
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if app.focus == Focus::Title {
                return;
            }
            if in_editor {
                app.focus = Focus::Editor;
            } else if in_chat {
                app.focus = Focus::Assist;
            }
        }
        _ => {}
    }
}
