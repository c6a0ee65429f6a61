use draftpad_core::{ChatRole, InputLine};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{visual_cursor, App, Focus};

const ASSIST_PLACEHOLDER: &str = "Ask for spelling and grammar help...";
const WORKING_TEXT: &str = "Checking your text";

/// Parse a line of reply text, rendering **bold** spans.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if close == 0 {
            // "****" is not a bold span
            spans.push(Span::raw(rest[..open + 4].to_string()));
            rest = &after_open[2..];
            continue;
        }
        if open > 0 {
            spans.push(Span::raw(rest[..open].to_string()));
        }
        spans.push(Span::styled(
            after_open[..close].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Split a line into rows of at most `width` chars. Row count always matches
/// `wrapped_rows`, so a line filling its last row exactly gets an empty row
/// for the cursor.
fn hard_wrap(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut rows: Vec<String> = chars.chunks(width).map(|c| c.iter().collect()).collect();
    if chars.len() % width == 0 {
        rows.push(String::new());
    }
    rows
}

/// Visible window of an input line, scrolled so the cursor stays on screen.
/// Returns the text and the cursor column inside the window.
fn input_window(input: &InputLine, width: usize) -> (String, usize) {
    let cursor = input.cursor();
    let offset = if width > 0 && cursor >= width {
        cursor - width + 1
    } else {
        0
    };
    let visible = input.text().chars().skip(offset).take(width).collect();
    (visible, cursor - offset)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.assist_open {
        let [editor_area, assist_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(body_area);
        render_editor(app, frame, editor_area);
        render_assist(app, frame, assist_area);
    } else {
        app.chat_area = None;
        render_editor(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let generator = app.session.generator();
    let status = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{}: {}", generator.name(), generator.model()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let status_width = status.width() as u16;

    let [title_area, status_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(status_width)]).areas(area);

    if app.focus == Focus::Title {
        let prefix = " Title: ";
        let prefix_width = prefix.chars().count();
        let width = (title_area.width as usize).saturating_sub(prefix_width + 1);
        let (visible, cursor_x) = input_window(&app.title_input, width);
        let line = Line::from(vec![
            Span::styled(prefix, Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::styled(visible, Style::default().fg(Color::White)),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
            title_area,
        );
        frame.set_cursor_position((
            title_area.x + (prefix_width + cursor_x) as u16,
            title_area.y,
        ));
    } else {
        let title = Line::from(Span::styled(
            format!(" {} ", app.document.title()),
            Style::default().fg(Color::Cyan).bold(),
        ));
        frame.render_widget(
            Paragraph::new(title).style(Style::default().bg(Color::DarkGray)),
            title_area,
        );
    }

    frame.render_widget(
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray)),
        status_area,
    );
}

fn render_editor(app: &mut App, frame: &mut Frame, area: Rect) {
    app.editor_area = Some(area);
    app.editor_height = area.height.saturating_sub(2);
    app.editor_width = area.width.saturating_sub(2);
    app.ensure_cursor_visible();

    let focused = app.focus == Focus::Editor;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let words = app.document.word_count();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Document ")
        .title_bottom(Line::from(format!(
            " {} word{} ",
            words,
            if words == 1 { "" } else { "s" }
        )));

    let width = app.editor_width as usize;
    let rows: Vec<Line> = app
        .document
        .lines()
        .iter()
        .flat_map(|line| hard_wrap(line, width))
        .map(Line::from)
        .collect();

    // Wrapping is done above so the cursor math matches what is drawn
    let editor = Paragraph::new(Text::from(rows))
        .block(block)
        .scroll((app.editor_scroll, 0));
    frame.render_widget(editor, area);

    if focused && app.editor_width > 0 {
        let (x, y) = visual_cursor(app.document.lines(), app.document.cursor(), width);
        let y = u16::try_from(y)
            .unwrap_or(u16::MAX)
            .saturating_sub(app.editor_scroll);
        if y < app.editor_height {
            frame.set_cursor_position((area.x + 1 + x as u16, area.y + 1 + y));
        }
    }
}

fn render_assist(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    app.chat_area = Some(area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let focused = app.focus == Focus::Assist;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let in_flight = app.session.is_in_flight();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Spelling Check ");

    let transcript = app.session.transcript();
    let chat_text = if transcript.is_empty() && !in_flight {
        Text::from(Span::styled(
            "Your conversation will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(msg.content.lines().map(|l| Line::from(l.to_string())));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(msg.content.lines().map(parse_markdown_line));
                }
            }
            lines.push(Line::default());
        }

        if in_flight {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("{}{}", WORKING_TEXT, dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Yellow
        } else {
            Color::DarkGray
        }));

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let input = app.session.input();
    let (visible, cursor_x) = input_window(input, inner_width);
    let input_widget = if input.is_empty() {
        Paragraph::new(Span::styled(
            ASSIST_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input_widget.block(input_block), input_area);

    if focused {
        frame.set_cursor_position((input_area.x + 1 + cursor_x as u16, input_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.focus {
        Focus::Editor => (" EDIT ", Style::default().bg(Color::Blue).fg(Color::White)),
        Focus::Title => (" TITLE ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Focus::Assist => (" ASSIST ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let bindings: &[(&str, &str)] = match app.focus {
        Focus::Editor if app.assist_open => &[
            ("Tab", "assist"),
            ("^K", "close check"),
            ("^T", "title"),
            ("^Q", "quit"),
        ],
        Focus::Editor => &[("^K", "spell check"), ("^T", "title"), ("^Q", "quit")],
        Focus::Title => &[("Enter", "save"), ("Esc", "cancel")],
        Focus::Assist => &[
            ("Enter", "send"),
            ("PgUp/PgDn", "scroll"),
            ("Esc", "editor"),
            ("^K", "close"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in bindings {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<(String, bool)> {
        line.spans
            .iter()
            .map(|s| {
                (
                    s.content.to_string(),
                    s.style.add_modifier.contains(Modifier::BOLD),
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("Change **their** to **they're**.");
        assert_eq!(
            span_texts(&line),
            vec![
                ("Change ".to_string(), false),
                ("their".to_string(), true),
                (" to ".to_string(), false),
                ("they're".to_string(), true),
                (".".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_parse_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(span_texts(&line), vec![("a **b".to_string(), false)]);
        assert!(parse_markdown_line("").spans.is_empty());
    }

    #[test]
    fn test_hard_wrap() {
        assert_eq!(hard_wrap("", 4), vec![""]);
        assert_eq!(hard_wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(hard_wrap("abcdefgh", 4), vec!["abcd", "efgh", ""]);
        assert_eq!(hard_wrap("héllo", 0), vec!["héllo"]);
    }

    #[test]
    fn test_input_window_keeps_cursor_visible() {
        let mut input = InputLine::new();
        input.insert_str("abcdefghij");
        assert_eq!(input_window(&input, 4), ("hij".to_string(), 3));

        input.move_home();
        assert_eq!(input_window(&input, 4), ("abcd".to_string(), 0));
    }
}
