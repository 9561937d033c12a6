use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::kv::KeyValueStore;
use crate::render::{self, Entry, View};

use super::app::{AppState, Focus, StatusKind};
use super::editor::{EditModal, LineInput};

const ADD_LABEL: &str = "[ Add ]";
const HELP_KEY_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_INPUT: Color = Color::Rgb(180, 156, 92);

pub fn render<K: KeyValueStore>(frame: &mut Frame, app: &AppState<K>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_input(frame, app, chunks[0]);
    render_chips(frame, &app.view, chunks[1]);
    render_list(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);

    if let Some(modal) = app.edit.as_ref() {
        render_edit_modal(frame, area, modal);
    } else if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_input<K: KeyValueStore>(frame: &mut Frame, app: &AppState<K>, area: Rect) {
    let focused = app.focus == Focus::Input && app.edit.is_none();
    let content_width = area.width.saturating_sub(2) as usize;
    let field_width = content_width.saturating_sub(ADD_LABEL.len() + 1);

    let mut spans = if focused {
        value_with_caret_spans(&app.input, field_width, Style::default().fg(COLOR_TEXT))
    } else if app.input.value().is_empty() {
        vec![Span::styled(
            pad_text("What needs to be done?", field_width),
            Style::default().fg(COLOR_MUTED_DARK),
        )]
    } else {
        vec![Span::styled(
            pad_text(&truncate_text(app.input.value(), field_width), field_width),
            Style::default().fg(COLOR_TEXT),
        )]
    };
    let used: usize = spans.iter().map(|span| span.content.chars().count()).sum();
    spans.push(Span::raw(" ".repeat(field_width.saturating_sub(used) + 1)));
    spans.push(Span::styled(
        ADD_LABEL,
        Style::default()
            .fg(COLOR_SUCCESS)
            .add_modifier(Modifier::BOLD),
    ));

    let border = if focused {
        COLOR_BORDER_INPUT
    } else {
        COLOR_BG_MUTED
    };
    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New task")
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(widget, area);
}

fn render_chips(frame: &mut Frame, view: &View, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (idx, chip) in view.chips.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let text = format!("{} {}", idx + 1, chip.label);
        let style = if chip.active {
            Style::default()
                .fg(COLOR_INFO)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list<K: KeyValueStore>(frame: &mut Frame, app: &AppState<K>, area: Rect) {
    let border = if app.focus == Focus::List {
        COLOR_BORDER_LIST
    } else {
        COLOR_BG_MUTED
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tasks")
        .border_style(Style::default().fg(border));

    if let Some(empty) = app.view.empty_state {
        let widget = Paragraph::new(Line::from(Span::styled(
            empty,
            Style::default().fg(COLOR_MUTED),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let content_width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let selected = app.selected_index();
    let (start, end) = list_window(app.view.entries.len(), selected, height);
    let highlight = app.focus == Focus::List;
    let lines: Vec<Line<'static>> = app.view.entries[start..end]
        .iter()
        .enumerate()
        .map(|(offset, entry)| {
            let is_selected = highlight && selected == Some(start + offset);
            render_list_row(entry, is_selected, content_width)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_list_row(entry: &Entry, selected: bool, width: usize) -> Line<'static> {
    let controls: Vec<&str> = entry.controls.iter().map(|control| control.label()).collect();
    let controls_text = controls.join("  ");
    let used = 1 + 3 + 1 + 1 + controls_text.len() + 1;
    let text_width = width.saturating_sub(used);
    let text = pad_text(&truncate_text(&entry.text, text_width), text_width);

    let text_style = if entry.completed {
        Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    } else {
        Style::default().fg(COLOR_TEXT)
    };
    let checkbox_style = if entry.checked {
        Style::default()
            .fg(COLOR_SUCCESS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_MUTED)
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(render::checkbox(entry.checked), checkbox_style),
        Span::raw(" "),
        Span::styled(text, text_style),
        Span::raw(" "),
        Span::styled(controls_text, Style::default().fg(COLOR_ACCENT)),
        Span::raw(" "),
    ];

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn render_footer<K: KeyValueStore>(frame: &mut Frame, app: &AppState<K>, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let summary_line = Line::from(Span::styled(
        app.view.summary.clone(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![summary_line, line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_edit_modal(frame: &mut Frame, area: Rect, modal: &EditModal) {
    let width = area.width.saturating_sub(8).min(72);
    let modal_area = centered_rect(width, 6, area);
    frame.render_widget(Clear, modal_area);

    let content_width = width.saturating_sub(2) as usize;
    let lines = vec![
        Line::from(Span::styled(
            "Edit your task:",
            Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
        )),
        Line::from(value_with_caret_spans(
            modal.input(),
            content_width,
            Style::default().fg(COLOR_TEXT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "enter save  esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Edit #{}", modal.task_id()))
            .border_style(Style::default().fg(COLOR_BORDER_INPUT)),
    );
    frame.render_widget(widget, modal_area);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(8).min(56);
    let lines = build_help_lines(width.saturating_sub(2) as usize);
    let modal_area = centered_rect(width, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, modal_area);
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal_area);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Input"),
        help_line("enter", "add task", width),
        help_line("ctrl+u", "clear input", width),
        help_line("tab/esc", "focus list", width),
        Line::from(""),
        help_header("List"),
        help_line("j/k", "move selection", width),
        help_line("space/x", "toggle completed", width),
        help_line("e/enter", "edit task", width),
        help_line("d/delete", "delete task", width),
        help_line("1/2/3", "all, active or completed", width),
        help_line("f", "next filter", width),
        help_line("i/a/tab", "focus input", width),
        help_line("q/esc", "quit", width),
        help_line("?", "hide help", width),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

/// Spans for a text field with a reversed-video caret, scrolled so the
/// caret stays within `width` columns.
fn value_with_caret_spans(input: &LineInput, width: usize, style: Style) -> Vec<Span<'static>> {
    if width == 0 {
        return vec![Span::raw("")];
    }
    let chars: Vec<char> = input.value().chars().collect();
    let len = chars.len();
    let cursor = input.cursor().min(len);
    let caret_at_end = cursor == len;
    let available = if caret_at_end {
        width.saturating_sub(1)
    } else {
        width
    };
    // Columns needed to show everything up to and including the caret cell.
    let needed = if caret_at_end { cursor } else { cursor + 1 };
    let mut start = needed.saturating_sub(available);
    if start + available > len {
        start = len.saturating_sub(available);
    }
    let end = (start + available).min(len);
    let window = &chars[start..end];

    let caret_index = cursor - start;
    let before: String = window[..caret_index.min(window.len())].iter().collect();
    let caret_char = window.get(caret_index).copied().unwrap_or(' ');
    let after: String = window
        .get(caret_index + 1..)
        .map(|rest| rest.iter().collect())
        .unwrap_or_default();

    let mut spans = Vec::new();
    if !before.is_empty() {
        spans.push(Span::styled(before, style));
    }
    spans.push(Span::styled(
        caret_char.to_string(),
        style.add_modifier(Modifier::REVERSED),
    ));
    if !after.is_empty() {
        spans.push(Span::styled(after, style));
    }
    spans
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::kv::MemoryStore;
    use crate::persist::TaskRepository;
    use crate::task::TaskStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(texts: &[&str]) -> AppState<MemoryStore> {
        let mut store = TaskStore::open(TaskRepository::new("todos", MemoryStore::new()));
        for text in texts {
            store.add(text);
        }
        AppState::new(Controller::new(store))
    }

    fn press(app: &mut AppState<MemoryStore>, code: KeyCode) {
        super::super::app::handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn draw(app: &AppState<MemoryStore>) -> Vec<String> {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn screen_contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }

    #[test]
    fn empty_store_shows_placeholder_and_summary() {
        let app = app_with(&[]);
        let lines = draw(&app);
        assert!(screen_contains(&lines, "No tasks here yet"));
        assert!(screen_contains(&lines, "0 tasks remaining"));
        assert!(screen_contains(&lines, "[ Add ]"));
    }

    #[test]
    fn rows_show_checkbox_text_and_controls() {
        let mut app = app_with(&["buy milk", "write spec"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char(' '));
        let lines = draw(&app);
        let row = lines
            .iter()
            .find(|line| line.contains("buy milk"))
            .expect("row for buy milk");
        assert!(row.contains("[x]"));
        assert!(row.contains("edit  del"));
        assert!(screen_contains(&lines, "[ ] write spec"));
        assert!(screen_contains(&lines, "1 task remaining"));
    }

    #[test]
    fn markup_is_painted_literally() {
        let text = "<img src=x onerror=alert(1)>";
        let app = app_with(&[text]);
        let lines = draw(&app);
        assert!(screen_contains(&lines, text));
    }

    #[test]
    fn active_chip_is_highlighted() {
        let mut app = app_with(&["a"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('3'));

        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, &app)).expect("draw");
        let buffer = terminal.backend().buffer();

        let chip_row = 3u16;
        let row: String = (0..buffer.area.width)
            .map(|x| buffer.get(x, chip_row).symbol().to_string())
            .collect();
        let completed_x = row.find("3 Completed").expect("completed chip") as u16;
        let all_x = row.find("1 All").expect("all chip") as u16;
        assert!(buffer
            .get(completed_x + 2, chip_row)
            .modifier
            .contains(Modifier::UNDERLINED));
        assert!(!buffer
            .get(all_x + 2, chip_row)
            .modifier
            .contains(Modifier::UNDERLINED));

        let lines = draw(&app);
        assert!(screen_contains(&lines, "No tasks here yet"));
        assert!(screen_contains(&lines, "1 task remaining"));
    }

    #[test]
    fn edit_modal_is_prefilled() {
        let mut app = app_with(&["draft"]);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('e'));
        let lines = draw(&app);
        assert!(screen_contains(&lines, "Edit your task:"));
        assert!(screen_contains(&lines, "Edit #1"));
    }

    #[test]
    fn truncate_and_pad() {
        assert_eq!(truncate_text("abcdef", 5), "ab...");
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(pad_text("ab", 4), "ab  ");
        assert_eq!(list_window(10, Some(9), 4), (6, 10));
    }

    fn caret_parts(input: &LineInput, width: usize) -> (String, String) {
        let spans = value_with_caret_spans(input, width, Style::default());
        let text: String = spans.iter().map(|span| &*span.content).collect();
        let caret = spans
            .iter()
            .find(|span| span.style.add_modifier.contains(Modifier::REVERSED))
            .map(|span| span.content.to_string())
            .unwrap_or_default();
        (text, caret)
    }

    #[test]
    fn caret_scrolls_into_view() {
        let mut input = LineInput::with_value("abcdefghij");
        assert_eq!(caret_parts(&input, 4), ("hij ".to_string(), " ".to_string()));

        for _ in 0..5 {
            input.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        }
        assert_eq!(input.cursor(), 5);
        assert_eq!(caret_parts(&input, 4), ("cdef".to_string(), "f".to_string()));

        input.handle_key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        assert_eq!(caret_parts(&input, 4), ("abcd".to_string(), "a".to_string()));
    }
}
