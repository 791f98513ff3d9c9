use contact_widget::{AlertKind, Field, Tab};
use unicode_width::UnicodeWidthChar;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::App;

const BUTTON_LABEL: &str = " 💡 Yordam kerak? ";
const PHONE_HINT: &str = "Sizga qo'ng'iroq qilamiz. Format: +998XXXXXXXXX";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_landing(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.widget.is_open() {
        render_modal(app, frame, body_area);
    } else {
        app.modal_area = None;
        app.tab_areas.clear();
        app.field_areas.clear();
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Yordam markazi ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("{} ", app.backend_url), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_landing(app: &mut App, frame: &mut Frame, area: Rect) {
    let intro = Paragraph::new(vec![
        Line::from(""),
        Line::from("Savolingiz bormi? Bizga yozing yoki qo'ng'iroq so'rang."),
        Line::from(Span::styled(
            "Enter yoki ? tugmasini bosing, yoki pastdagi tugmani bosing.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, area);

    // Floating help button, bottom-right corner
    let button_width = (Line::from(BUTTON_LABEL).width() as u16 + 2).min(area.width);
    let button_height = 3.min(area.height);
    let button_area = Rect::new(
        area.x + area.width.saturating_sub(button_width + 1),
        area.y + area.height.saturating_sub(button_height),
        button_width,
        button_height,
    );

    let button = Paragraph::new(BUTTON_LABEL)
        .style(Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)));
    frame.render_widget(button, button_area);
    app.button_area = Some(button_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let open = app.widget.is_open();

    let (mode_text, mode_style) = if open {
        (" YORDAM ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" ASOSIY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if open {
        let mut hints = vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" F1/F2 ", key_style),
            Span::styled(" tab ", label_style),
        ];
        if app.widget.active_tab() == Tab::Phone {
            hints.extend(vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" field ", label_style),
            ]);
        }
        hints.extend(vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]);
        hints
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" help ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_modal(app: &mut App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = 20.min(area.height.saturating_sub(2));

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);
    app.modal_area = Some(popup_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 💡 Yordam kerak? ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [tabs_area, _, alert_area, form_area, button_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_tabs(app, frame, tabs_area);
    render_alert(app, frame, alert_area);

    app.field_areas.clear();
    match app.widget.active_tab() {
        Tab::Webchat => {
            render_input(app, frame, form_area, Field::WebchatMessage, " Xabar ", true);
        }
        Tab::Phone => {
            let [phone_area, hint_area, note_area] = Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .areas(form_area);

            render_input(app, frame, phone_area, Field::PhoneNumber, " Telefon raqam ", false);
            let hint = Paragraph::new(PHONE_HINT).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, hint_area);
            render_input(
                app,
                frame,
                note_area,
                Field::PhoneNote,
                " Qo'shimcha xabar (ixtiyoriy) ",
                true,
            );
        }
    }

    render_submit_button(app, frame, button_area);
}

fn render_tabs(app: &mut App, frame: &mut Frame, area: Rect) {
    app.tab_areas.clear();

    let mut x = area.x;
    for tab in Tab::all() {
        let label = format!(" {} ", tab.title());
        let width = (Line::from(label.as_str()).width() as u16).min(area.right().saturating_sub(x));
        if width == 0 {
            break;
        }

        let style = if tab == app.widget.active_tab() {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let tab_area = Rect::new(x, area.y, width, 1);
        frame.render_widget(Paragraph::new(label).style(style), tab_area);
        app.tab_areas.push((tab, tab_area));

        x += width + 1;
    }
}

fn render_alert(app: &App, frame: &mut Frame, area: Rect) {
    let Some(alert) = app.widget.alert() else {
        return;
    };

    let style = match alert.kind {
        AlertKind::Success => Style::default().fg(Color::Green),
        AlertKind::Error => Style::default().fg(Color::Red),
    };

    let paragraph = Paragraph::new(alert.text.as_str())
        .style(style.add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_input(
    app: &mut App,
    frame: &mut Frame,
    area: Rect,
    field: Field,
    title: &str,
    multiline: bool,
) {
    app.field_areas.push((field, area));

    let focused = app.widget.focus() == Some(field);
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_string());
    let inner = block.inner(area);

    let value = app.widget.field(field);
    let (rows, (col, row)) = if multiline {
        wrap_chars(value, inner.width, app.cursor)
    } else {
        let before: String = value.chars().take(app.cursor).collect();
        let offset = Line::from(before).width() as u16;
        (vec![value.to_string()], (offset.min(inner.width.saturating_sub(1)), 0))
    };

    let text: Vec<Line> = if value.is_empty() {
        vec![Line::from(Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray)))]
    } else {
        rows.into_iter().map(Line::from).collect()
    };

    // Keep the cursor row visible
    let scroll = row.saturating_sub(inner.height.saturating_sub(1));
    let mut paragraph = Paragraph::new(text).block(block).scroll((scroll, 0));
    if value.is_empty() && multiline {
        paragraph = paragraph.wrap(Wrap { trim: false });
    }
    frame.render_widget(paragraph, area);

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((inner.x + col, inner.y + row - scroll));
    }
}

/// Split `text` into rows no wider than `width` columns, breaking between any
/// two characters. Also returns the (column, row) of char index `cursor`.
fn wrap_chars(text: &str, width: u16, cursor: usize) -> (Vec<String>, (u16, u16)) {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut col: u16 = 0;
    let mut cursor_pos = None;

    for (i, c) in text.chars().enumerate() {
        let w = c.width().unwrap_or(0) as u16;
        if col > 0 && col + w > width {
            rows.push(std::mem::take(&mut current));
            col = 0;
        }
        if i == cursor {
            cursor_pos = Some((col, rows.len() as u16));
        }
        current.push(c);
        col += w;
    }

    // Cursor past the last char sits after it, or at the start of the next row
    let cursor_pos = cursor_pos.unwrap_or(if width > 0 && col >= width {
        (0, rows.len() as u16 + 1)
    } else {
        (col, rows.len() as u16)
    });
    rows.push(current);

    (rows, cursor_pos)
}

fn render_submit_button(app: &App, frame: &mut Frame, area: Rect) {
    let tab = app.widget.active_tab();
    let style = if app.widget.is_submitting(tab) {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let label = format!("  {}  ", app.widget.submit_label(tab));
    let button = Paragraph::new(Line::from(Span::styled(label, style))).alignment(Alignment::Right);
    frame.render_widget(button, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contact_widget::{ContactBackend, ContactError, SubmissionRequest, SubmissionResult};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct NoBackend;

    #[async_trait]
    impl ContactBackend for NoBackend {
        async fn submit(
            &self,
            _request: &SubmissionRequest,
        ) -> Result<SubmissionResult, ContactError> {
            Err(ContactError::Transport("offline".to_string()))
        }
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Arc::new(NoBackend), "http://test", tx)
    }

    #[test]
    fn test_landing_records_button_area() {
        let mut app = test_app();
        let screen = draw(&mut app);

        assert!(screen.contains("Yordam markazi"));
        assert!(app.button_area.is_some());
        assert!(app.modal_area.is_none());
        assert!(app.tab_areas.is_empty());
    }

    #[test]
    fn test_modal_shows_tabs_alert_and_button() {
        let mut app = test_app();
        app.open();
        app.widget.show_alert("Xato", AlertKind::Error);
        let screen = draw(&mut app);

        assert!(screen.contains("Xato"));
        assert!(screen.contains("Yuborish"));
        assert!(screen.contains("Savolingizni yozing..."));
        assert_eq!(app.tab_areas.len(), 2);
        assert!(app.modal_area.is_some());
    }

    #[test]
    fn test_wrap_chars_breaks_mid_word() {
        let (rows, cursor) = wrap_chars("salom dunyo", 4, 6);
        assert_eq!(rows, vec!["salo", "m du", "nyo"]);
        assert_eq!(cursor, (2, 1));

        let (rows, cursor) = wrap_chars("abcd", 4, 4);
        assert_eq!(rows, vec!["abcd"]);
        assert_eq!(cursor, (0, 1));

        let (rows, cursor) = wrap_chars("", 4, 0);
        assert_eq!(rows, vec![""]);
        assert_eq!(cursor, (0, 0));
    }

    #[test]
    fn test_wrap_chars_counts_wide_chars() {
        let (rows, cursor) = wrap_chars("ab💬c", 3, 3);
        assert_eq!(rows, vec!["ab", "💬c"]);
        assert_eq!(cursor, (2, 1));
    }

    #[test]
    fn test_long_message_wraps_by_character() {
        let mut app = test_app();
        app.open();
        let message = "qo'ng'iroq ".repeat(12);
        for c in message.chars() {
            app.insert_char(c);
        }
        let screen = draw(&mut app);

        // Input inner width is 60: the 64 column modal and the input box each take two borders
        let first_row: String = message.chars().take(60).collect();
        let second_row: String = message.chars().skip(60).take(60).collect();
        assert!(first_row.ends_with("qo'ng"));
        assert!(screen.contains(&first_row));
        assert!(screen.contains(&second_row));
        assert_eq!(app.field_areas.len(), 1);
    }

    #[test]
    fn test_phone_tab_renders_both_fields() {
        let mut app = test_app();
        app.open();
        app.switch_tab(Tab::Phone);
        let screen = draw(&mut app);

        assert!(screen.contains("Telefon raqam"));
        assert!(screen.contains("+998XXXXXXXXX"));
        assert!(screen.contains("ixtiyoriy"));
        assert_eq!(app.field_areas.len(), 2);
    }
}
