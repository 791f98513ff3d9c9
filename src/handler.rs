use anyhow::Result;
use contact_widget::Tab;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Submission(ticket, outcome) => app.apply_outcome(ticket, outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.widget.is_open() {
        handle_modal_key(app, key);
    } else {
        handle_landing_key(app, key);
    }
}

fn handle_landing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char(' ') => app.open(),
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => app.close(),

        // Tab switching
        KeyCode::F(1) => app.switch_tab(Tab::Webchat),
        KeyCode::F(2) => app.switch_tab(Tab::Phone),
        KeyCode::Left | KeyCode::Right if ctrl => {
            let other = app.widget.active_tab().other();
            app.switch_tab(other);
        }

        // Field focus (only the phone tab has more than one field)
        KeyCode::Tab => app.next_field(),
        KeyCode::BackTab => app.prev_field(),

        KeyCode::Enter => app.submit(),

        // Editing
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),

        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;

    if !app.widget.is_open() {
        if app.button_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
            app.open();
        }
        return;
    }

    let clicked_tab = app
        .tab_areas
        .iter()
        .find(|(_, area)| point_in_rect(x, y, *area))
        .map(|(tab, _)| *tab);

    let clicked_field = app
        .field_areas
        .iter()
        .find(|(_, area)| point_in_rect(x, y, *area))
        .map(|(field, _)| *field);

    if let Some(tab) = clicked_tab {
        app.switch_tab(tab);
    } else if let Some(field) = clicked_field {
        app.focus_field(field);
    } else if !app.modal_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
        // Backdrop click
        app.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contact_widget::{
        AlertKind, ContactBackend, ContactError, Field, SubmissionRequest, SubmissionResult,
    };
    use crossterm::event::KeyEventState;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct UnreachableBackend;

    #[async_trait]
    impl ContactBackend for UnreachableBackend {
        async fn submit(
            &self,
            _request: &SubmissionRequest,
        ) -> Result<SubmissionResult, ContactError> {
            Err(ContactError::Transport("connection refused".to_string()))
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(UnreachableBackend), "http://test", tx), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        press_with(app, code, KeyModifiers::NONE);
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        let key = KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_event(app, AppEvent::Mouse(mouse)).unwrap();
    }

    #[test]
    fn test_landing_keys() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Enter);
        assert!(app.widget.is_open());

        press(&mut app, KeyCode::Esc);
        assert!(!app.widget.is_open());
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_modal() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('?'));
        press_with(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
        assert_eq!(app.widget.field(Field::WebchatMessage), "");
    }

    #[test]
    fn test_q_is_text_inside_modal() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "qani?");
        assert!(!app.should_quit);
        assert_eq!(app.widget.field(Field::WebchatMessage), "qani?");
    }

    #[test]
    fn test_tab_switch_keys() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::F(2));
        assert_eq!(app.widget.active_tab(), Tab::Phone);
        press_with(&mut app, KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(app.widget.active_tab(), Tab::Webchat);
        press_with(&mut app, KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(app.widget.active_tab(), Tab::Phone);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.widget.active_tab(), Tab::Webchat);
    }

    #[test]
    fn test_phone_fields_and_local_validation() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "998901234567");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "tezroq");

        press(&mut app, KeyCode::Enter);

        assert!(!app.widget.is_submitting(Tab::Phone));
        assert_eq!(app.widget.alert().map(|a| a.kind), Some(AlertKind::Error));
        assert_eq!(app.widget.field(Field::PhoneNumber), "998901234567");
        assert_eq!(app.widget.field(Field::PhoneNote), "tezroq");
    }

    #[tokio::test]
    async fn test_transport_failure_via_events() {
        let (mut app, mut rx) = test_app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Salom");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.widget.submit_label(Tab::Webchat), "Yuborilmoqda...");

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();

        assert_eq!(app.widget.submit_label(Tab::Webchat), "Yuborish");
        assert_eq!(
            app.widget.alert().map(|a| a.text.as_str()),
            Some("Tarmoq xatoligi. Qaytadan urinib ko'ring.")
        );
        assert_eq!(app.widget.field(Field::WebchatMessage), "Salom");
    }

    #[test]
    fn test_mouse_button_tabs_and_backdrop() {
        let (mut app, _rx) = test_app();
        app.button_area = Some(Rect::new(60, 20, 18, 3));

        click(&mut app, 1, 1);
        assert!(!app.widget.is_open());
        click(&mut app, 65, 21);
        assert!(app.widget.is_open());

        app.modal_area = Some(Rect::new(10, 5, 50, 15));
        app.tab_areas = vec![
            (Tab::Webchat, Rect::new(12, 6, 10, 1)),
            (Tab::Phone, Rect::new(23, 6, 15, 1)),
        ];

        click(&mut app, 25, 6);
        assert_eq!(app.widget.active_tab(), Tab::Phone);

        app.field_areas = vec![
            (Field::PhoneNumber, Rect::new(12, 9, 40, 3)),
            (Field::PhoneNote, Rect::new(12, 13, 40, 5)),
        ];
        click(&mut app, 20, 15);
        assert_eq!(app.widget.focus(), Some(Field::PhoneNote));

        click(&mut app, 30, 12);
        assert!(app.widget.is_open());

        click(&mut app, 2, 2);
        assert!(!app.widget.is_open());
    }
}
