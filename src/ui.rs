use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::conversation::Role;

const MAX_COMPOSER_LINES: u16 = 5;

/// Render `**bold**` and `` `code` `` spans; unmatched markers stay literal.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let next = [("**", Style::default().add_modifier(Modifier::BOLD)), ("`", Style::default().fg(Color::Green))]
            .into_iter()
            .filter_map(|(marker, style)| {
                let start = rest.find(marker)?;
                let after = &rest[start + marker.len()..];
                let len = after.find(marker)?;
                (len > 0).then_some((start, marker, len, style))
            })
            .min_by_key(|(start, ..)| *start);

        let Some((start, marker, len, style)) = next else {
            spans.push(Span::raw(rest.to_string()));
            break;
        };

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        let inner_start = start + marker.len();
        spans.push(Span::styled(rest[inner_start..inner_start + len].to_string(), style));
        rest = &rest[inner_start + len + marker.len()..];
    }

    Line::from(spans)
}

/// Cursor `(column, row)` inside the composer text. Columns are display
/// cells, so wide characters count twice.
pub fn composer_cursor(input: &str, cursor: usize) -> (usize, usize) {
    let before: String = input.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let column = before.rsplit('\n').next().map_or(0, UnicodeWidthStr::width);
    (column, row)
}

/// Smallest offset that keeps `position` inside a window of `visible` cells.
fn scroll_to_show(position: usize, visible: usize) -> usize {
    if visible > 0 && position >= visible {
        position - visible + 1
    } else {
        0
    }
}

fn composer_height(input: &str) -> u16 {
    let lines = u16::try_from(input.split('\n').count()).unwrap_or(u16::MAX);
    lines.clamp(1, MAX_COMPOSER_LINES) + 2
}

/// RFC 3339 timestamp shown in local time; unparseable input is shown as-is.
pub fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let banner_height = u16::from(app.conversation.error().is_some());
    let composer_height = composer_height(&app.input);

    let [header_area, status_area, chat_area, banner_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(banner_height),
        Constraint::Length(composer_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_status(app, frame, status_area);
    render_chat(app, frame, chat_area);
    if banner_height > 0 {
        render_error_banner(app, frame, banner_area);
    }
    render_composer(app, frame, input_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AI Conversation Console ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("{} · {}", app.transport.name(), app.base_url),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let [worker_area, health_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let conv = &app.conversation;

    let (worker_line, model_line) = match conv.status() {
        Some(status) => (
            status.message.clone(),
            format!("Model: {}", status.model.as_deref().unwrap_or("not configured")),
        ),
        None => ("Connecting...".to_string(), "Model: not configured".to_string()),
    };
    let worker = Paragraph::new(vec![
        Line::from(Span::styled(worker_line, Style::default().bold())),
        Line::from(Span::styled(model_line, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Worker "),
    );
    frame.render_widget(worker, worker_area);

    let (health_line, health_style, updated_line) = match (conv.health(), conv.health_error()) {
        (Some(health), _) => (
            health.status.clone(),
            Style::default().fg(Color::Green).bold(),
            format!("Updated {}", format_timestamp(&health.timestamp)),
        ),
        (None, Some(err)) => (err.to_string(), Style::default().fg(Color::Red).bold(), "Waiting for signal".to_string()),
        (None, None) => ("Checking...".to_string(), Style::default().bold(), "Waiting for signal".to_string()),
    };
    let health = Paragraph::new(vec![
        Line::from(Span::styled(health_line, health_style)),
        Line::from(Span::styled(updated_line, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" System health "),
    );
    frame.render_widget(health, health_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store inner dimensions for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.conversation.messages() {
        let (label, label_style) = match msg.role {
            Role::User => ("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Role::Assistant => ("AI Core", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        };

        let mut meta = vec![Span::styled(label, label_style)];
        if let Some(model) = &msg.model {
            let detail = match &msg.finish_reason {
                Some(reason) => format!("  {model} · {reason}"),
                None => format!("  {model}"),
            };
            meta.push(Span::styled(detail, Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(meta));

        match msg.role {
            Role::User => lines.extend(msg.content.lines().map(|line| Line::from(line.to_string()))),
            Role::Assistant => lines.extend(msg.content.lines().map(parse_markdown_line)),
        }
        if msg.content.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::default());
    }

    if app.is_busy() {
        lines.push(Line::from(Span::styled(
            "AI Core",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(usize::from(app.animation_frame) + 1);
        lines.push(Line::from(Span::styled(
            format!("Generating{dots}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Conversation ({}) ", app.conversation.messages().len())),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_error_banner(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(err) = app.conversation.error() {
        let banner = Paragraph::new(format!(" {err}")).style(Style::default().bg(Color::Red).fg(Color::White).bold());
        frame.render_widget(banner, area);
    }
}

fn render_composer(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.is_busy();
    let (title, border_color) = if busy {
        (" Generating... ", Color::DarkGray)
    } else {
        (" Ask (Enter to send) ", Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Scroll both ways so the cursor stays visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let (column, row) = composer_cursor(&app.input, app.input_cursor);
    let column_offset = scroll_to_show(column, inner_width);
    let row_offset = scroll_to_show(row, inner_height);

    let lines: Vec<Line> = app.input.split('\n').map(|line| Line::from(line.to_string())).collect();
    let style = if busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let composer = Paragraph::new(lines)
        .style(style)
        .block(block)
        .scroll((to_u16(row_offset), to_u16(column_offset)));
    frame.render_widget(composer, area);

    if !busy {
        let cursor_x = to_u16(column - column_offset);
        let cursor_y = to_u16(row - row_offset);
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + cursor_y + 1));
    }
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Shift+Enter ", key_style),
        Span::styled(" newline ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" page ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;
