use crate::app::{App, Focus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_ROWS: u16 = 10;

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if handle_global_key(app, key) {
        return;
    }
    match app.focus {
        Focus::Composer => handle_composer_key(app, key),
        Focus::Language => handle_language_key(app, key.code),
        Focus::RepoOwner | Focus::RepoName | Focus::RepoRef => handle_field_key(app, key),
        Focus::Sidebar => handle_sidebar_key(app, key.code),
    }
}

/// Keys that work regardless of focus. Returns whether the key was consumed.
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => app.should_quit = true,
        KeyCode::Char('t') if ctrl => app.toggle_mode(),
        KeyCode::Char('n') if ctrl => app.new_chat(),
        KeyCode::Char('r') if ctrl => {
            app.status_message = Some("Refreshing sessions...".to_string());
            app.refresh_sessions();
        }
        KeyCode::Esc => {
            if !app.cancel() {
                app.focus = Focus::Composer;
            }
        }
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_previous(),
        KeyCode::PageUp => app.widget.conversation_mut().scroll_up(PAGE_ROWS),
        KeyCode::PageDown => app.widget.conversation_mut().scroll_down(PAGE_ROWS),
        KeyCode::F(n @ 1..=4) => app.use_example(usize::from(n - 1)),
        _ => return false,
    }
    true
}

fn handle_composer_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.widget.edit_composer(|composer| composer.insert_newline());
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Char(c) => {
            if app.status_message.is_some() {
                app.status_message = None;
            }
            app.widget.edit_composer(|composer| composer.insert_char(c));
        }
        KeyCode::Backspace => app.widget.edit_composer(|composer| composer.backspace()),
        _ => {}
    }
}

fn handle_language_key(app: &mut App, code: KeyCode) {
    let language = &mut app.widget.mode_mut().language;
    match code {
        KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => language.next(),
        KeyCode::Left | KeyCode::Up => language.previous(),
        KeyCode::Enter => app.focus = Focus::Composer,
        _ => {}
    }
}

fn handle_field_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.focus = Focus::Composer,
        KeyCode::Char(c) => {
            if let Some(field) = app.focused_field() {
                field.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = app.focused_field() {
                field.pop();
            }
        }
        _ => {}
    }
}

fn handle_sidebar_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => app.widget.sidebar_mut().move_up(),
        KeyCode::Down | KeyCode::Char('j') => app.widget.sidebar_mut().move_down(),
        KeyCode::Enter => app.open_highlighted_session(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_highlighted_session(),
        _ => {}
    }
}
