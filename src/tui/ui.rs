use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, Speaker};
use crate::tui::markdown::accent;

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Draw the UI
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Transcript
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Input field
        ])
        .split(f.area());

    render_messages(f, app, chunks[0]);
    render_status(f, app, chunks[1]);
    render_input(f, app, chunks[2]);
}

fn speaker_label(speaker: Speaker) -> (&'static str, Style) {
    match speaker {
        Speaker::User => ("You", accent(Color::Green, Modifier::BOLD)),
        Speaker::Bot => ("Help Desk", accent(Color::Blue, Modifier::BOLD)),
        Speaker::System => ("System", accent(Color::Yellow, Modifier::BOLD)),
    }
}

/// Render the transcript
fn render_messages(f: &mut Frame, app: &App, area: Rect) {
    let messages_block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Conversation", accent(Color::Cyan, Modifier::BOLD)));

    let mut lines: Vec<Line> = Vec::new();

    for (i, (speaker, text)) in app.rendered_messages.iter().enumerate() {
        let (label, style) = speaker_label(*speaker);
        lines.push(Line::from(vec![Span::styled(format!("{}: ", label), style)]));
        lines.extend(text.lines.clone());

        if i + 1 < app.rendered_messages.len() {
            lines.push(Line::from(vec![Span::styled(
                "─".repeat(area.width.saturating_sub(2) as usize),
                Style::default().fg(Color::DarkGray),
            )]));
        }
    }

    if let Some(label) = &app.busy {
        lines.push(Line::from(vec![Span::styled(
            format!("{} {}", SPINNER_FRAMES[app.spinner_frame], label),
            accent(Color::Blue, Modifier::BOLD),
        )]));
    }

    let total_height = lines.len();
    let scroll = u16::try_from(app.scroll_position).unwrap_or(u16::MAX);

    let messages = Paragraph::new(lines)
        .block(messages_block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    let mut scrollbar_state = ScrollbarState::default()
        .content_length(total_height)
        .position(app.scroll_position);

    f.render_widget(messages, area);
    f.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Render the status line showing the indexed site
fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let status = match &app.site {
        Some(site) => Line::from(vec![
            Span::styled("Site: ", Style::default().fg(Color::DarkGray)),
            Span::raw(site.clone()),
        ]),
        None => Line::from(Span::styled(
            "No site indexed. Use /crawl <url>",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(status), area);
}

/// Render input field
fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "Question or /crawl <url>",
            accent(Color::Cyan, Modifier::BOLD),
        ));

    let inner_area = input_block.inner(area);

    let input = Paragraph::new(app.input.as_str()).block(input_block);
    f.render_widget(input, area);

    let offset = u16::try_from(app.input_before_cursor().width()).unwrap_or(u16::MAX);
    let cursor_x = inner_area.x.saturating_add(offset);
    f.set_cursor_position((cursor_x.min(inner_area.right()), inner_area.y));
}
