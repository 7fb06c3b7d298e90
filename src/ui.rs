use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use minichat::{BubbleKind, ChatRole};

use crate::app::App;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, chat_area, composer_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(app.composer_rows() + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_messages(app, frame, chat_area);
    render_composer(app, frame, composer_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" minichat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}: {}]", app.policy.display_name(), app.model),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    if app.session.transcript_mut().take_scroll_request() {
        app.scroll_to_bottom();
    }

    let mut lines: Vec<Line> = Vec::new();
    for bubble in app.session.transcript().bubbles() {
        let label_style = match (bubble.kind, bubble.role) {
            (BubbleKind::Error, _) => Style::default().fg(Color::Red),
            (_, ChatRole::User) => Style::default().fg(Color::Cyan),
            (_, ChatRole::Assistant) => Style::default().fg(Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", bubble.label),
            label_style.add_modifier(Modifier::BOLD),
        )));

        match bubble.kind {
            BubbleKind::Thinking => {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("{}{}", bubble.text.trim_end_matches('…'), dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            _ if bubble.text.is_empty() => lines.push(Line::default()),
            _ => match bubble.role {
                ChatRole::User => {
                    lines.extend(bubble.text.lines().map(|l| Line::from(l.to_string())));
                }
                ChatRole::Assistant => {
                    lines.extend(bubble.text.lines().map(parse_markdown_line));
                }
            },
        }
        lines.push(Line::default());
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let messages = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(messages, area);

    let max_scroll = app.max_scroll();
    if max_scroll > 0 {
        let mut state = ScrollbarState::new(max_scroll as usize).position(app.scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_composer(app: &App, frame: &mut Frame, area: Rect) {
    let strings = app.session.language().strings();
    let border_color = if app.is_busy() { Color::DarkGray } else { Color::Yellow };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(strings.composer_title);

    if app.composer.is_empty() {
        let hint = Paragraph::new(Span::styled(
            strings.composer_hint,
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(hint, area);
        frame.set_cursor_position((area.x + 1, area.y + 1));
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let rows = app.composer_rows() as usize;
    let (cursor_line, cursor_col) = app.cursor_line_col();

    // Keep the cursor row visible, then scroll the cursor line horizontally
    let first_row = (cursor_line + 1).saturating_sub(rows);
    let h_offset = if inner_width == 0 || cursor_col < inner_width {
        0
    } else {
        cursor_col - inner_width + 1
    };

    let visible: Vec<Line> = app
        .composer
        .split('\n')
        .enumerate()
        .skip(first_row)
        .take(rows)
        .map(|(i, line)| {
            let skip = if i == cursor_line { h_offset } else { 0 };
            Line::from(line.chars().skip(skip).take(inner_width).collect::<String>())
        })
        .collect();

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    frame.set_cursor_position((
        area.x + 1 + (cursor_col - h_offset) as u16,
        area.y + 1 + (cursor_line - first_row) as u16,
    ));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.is_busy() {
        Span::styled(" waiting for reply ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        Span::styled(" ready ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let footer = Line::from(vec![
        status,
        Span::styled(
            "  Enter send  Alt+Enter newline  ↑/↓ PgUp/PgDn scroll  Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markdown_bold() {
        let line = parse_markdown_line("a **b** c");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "b");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_parse_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("price **rising");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "price **rising");
    }

    #[test]
    fn test_parse_markdown_unclosed_after_bold() {
        let line = parse_markdown_line("**up** then **down");
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[0].content, "up");
        assert_eq!(line.spans[1].content, " then **down");
    }

    #[test]
    fn test_parse_markdown_empty() {
        assert!(parse_markdown_line("").spans.is_empty());
    }
}
