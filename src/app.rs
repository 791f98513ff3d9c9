use std::sync::Arc;
use std::time::Instant;

use contact_widget::{
    ContactBackend, ContactError, Field, SubmissionResult, SubmitAttempt, SubmitTicket, Tab,
    WidgetController,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub widget: WidgetController,

    // Cursor (char index) within the focused field
    pub cursor: usize,
    cursor_field: Option<Field>,

    // Areas for mouse hit-testing (updated during render)
    pub button_area: Option<Rect>,
    pub modal_area: Option<Rect>,
    pub tab_areas: Vec<(Tab, Rect)>,
    pub field_areas: Vec<(Field, Rect)>,

    // Backend and the channel outcomes come back on
    pub backend: Arc<dyn ContactBackend>,
    pub backend_url: String,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        backend: Arc<dyn ContactBackend>,
        backend_url: &str,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            widget: WidgetController::new(),

            cursor: 0,
            cursor_field: None,

            button_area: None,
            modal_area: None,
            tab_areas: Vec::new(),
            field_areas: Vec::new(),

            backend,
            backend_url: backend_url.to_string(),
            events,
        }
    }

    // Widget actions

    pub fn open(&mut self) {
        self.widget.open();
        self.sync_cursor();
    }

    pub fn close(&mut self) {
        self.widget.close();
        self.sync_cursor();
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.widget.switch_tab(tab);
        self.sync_cursor();
    }

    pub fn focus_field(&mut self, field: Field) {
        if self.widget.focus_field(field) {
            self.sync_cursor();
        }
    }

    pub fn next_field(&mut self) {
        self.widget.focus_next_field();
        self.sync_cursor();
    }

    pub fn prev_field(&mut self) {
        self.widget.focus_prev_field();
        self.sync_cursor();
    }

    /// Submit the active tab. Validation and the submit guard run here, on the
    /// UI task; only the HTTP call moves to a background task.
    pub fn submit(&mut self) {
        let tab = self.widget.active_tab();
        if let SubmitAttempt::Pending(pending) = self.widget.begin_submit(tab) {
            let backend = Arc::clone(&self.backend);
            let events = self.events.clone();
            tokio::spawn(async move {
                let outcome = backend.submit(&pending.request).await;
                // Receiver gone means the app is shutting down.
                let _ = events.send(AppEvent::Submission(pending.ticket, outcome));
            });
        }
    }

    pub fn apply_outcome(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<SubmissionResult, ContactError>,
    ) {
        self.widget.complete(ticket, outcome, Instant::now());
        self.sync_cursor();
    }

    /// Called on every Tick event
    pub fn tick(&mut self) {
        if self.widget.tick(Instant::now()) {
            self.sync_cursor();
        }
    }

    // Text editing on the focused field

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        if let Some(input) = self.widget.focused_input_mut() {
            let byte_pos = char_to_byte_index(input, cursor);
            input.insert(byte_pos, c);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor - 1;
        if let Some(input) = self.widget.focused_input_mut() {
            let byte_pos = char_to_byte_index(input, cursor);
            input.remove(byte_pos);
            self.cursor = cursor;
        }
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor;
        if let Some(input) = self.widget.focused_input_mut() {
            if cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, cursor);
                input.remove(byte_pos);
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.focused_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.focused_len();
    }

    fn focused_len(&self) -> usize {
        self.widget
            .focus()
            .map(|f| self.widget.field(f).chars().count())
            .unwrap_or(0)
    }

    /// Keep the cursor inside the focused field; jump to its end when focus moved.
    fn sync_cursor(&mut self) {
        let focus = self.widget.focus();
        if focus != self.cursor_field {
            self.cursor_field = focus;
            self.cursor = self.focused_len();
        } else {
            self.cursor = self.cursor.min(self.focused_len());
        }
    }
}
