use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

/// Accumulates spans into lines while walking markdown events
#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineBuilder {
    fn push(&mut self, span: Span<'static>) {
        self.current.push(span);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let line = Line::from(std::mem::take(&mut self.current));
            self.lines.push(line);
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_none_or(|line| line.spans.is_empty()) {
            return;
        }
        self.lines.push(Line::default());
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

/// Style with a foreground color and one modifier
pub fn accent(color: Color, modifier: Modifier) -> Style {
    Style::default().fg(color).add_modifier(modifier)
}

/// Converts markdown text to ratatui Text for rendering in the terminal UI
pub fn markdown_to_ratatui_text(markdown: &str) -> Text<'static> {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut out = LineBuilder::default();
    let mut style_stack: Vec<Style> = vec![Style::default()];
    let mut ordered_next: Vec<Option<u64>> = Vec::new();

    let current = |stack: &Vec<Style>| stack.last().copied().unwrap_or_default();

    for event in parser {
        match event {
            Event::Text(text) => {
                let lines: Vec<&str> = text.split('\n').collect();
                for (i, part) in lines.iter().enumerate() {
                    if i > 0 {
                        out.flush();
                    }
                    if !part.is_empty() {
                        out.push(Span::styled(part.to_string(), current(&style_stack)));
                    }
                }
            }
            Event::Code(code) => {
                out.push(Span::styled(format!("`{}`", code), Style::default().fg(Color::Green)));
            }
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    let level_color = match level {
                        HeadingLevel::H1 => Color::Rgb(255, 99, 71),
                        HeadingLevel::H2 => Color::Rgb(70, 130, 180),
                        _ => Color::Cyan,
                    };
                    out.flush();
                    style_stack.push(accent(level_color, Modifier::BOLD));
                }
                Tag::Paragraph => out.flush(),
                Tag::Strong => style_stack.push(current(&style_stack).add_modifier(Modifier::BOLD)),
                Tag::Emphasis => {
                    style_stack.push(current(&style_stack).add_modifier(Modifier::ITALIC))
                }
                Tag::BlockQuote(_) => {
                    out.flush();
                    style_stack.push(Style::default().fg(Color::Yellow));
                    out.push(Span::raw("  │ "));
                }
                Tag::CodeBlock(kind) => {
                    out.blank();
                    if let CodeBlockKind::Fenced(lang) = kind {
                        if !lang.is_empty() {
                            out.push(Span::styled(
                                format!("[{}]", lang),
                                accent(Color::Blue, Modifier::ITALIC),
                            ));
                            out.flush();
                        }
                    }
                    style_stack.push(Style::default().fg(Color::Green));
                }
                Tag::List(start) => {
                    out.flush();
                    ordered_next.push(start);
                }
                Tag::Item => {
                    out.flush();
                    let indent = "  ".repeat(ordered_next.len().saturating_sub(1));
                    match ordered_next.last_mut() {
                        Some(Some(n)) => {
                            out.push(Span::raw(format!("{}{}. ", indent, n)));
                            *n += 1;
                        }
                        _ => out.push(Span::raw(format!("{}• ", indent))),
                    }
                }
                Tag::Link { .. } => style_stack.push(accent(Color::Blue, Modifier::UNDERLINED)),
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Heading(_) | TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                    style_stack.pop();
                    out.blank();
                }
                TagEnd::Paragraph => {
                    if ordered_next.is_empty() {
                        out.blank();
                    } else {
                        out.flush();
                    }
                }
                TagEnd::Strong | TagEnd::Emphasis | TagEnd::Link => {
                    style_stack.pop();
                }
                TagEnd::List(_) => {
                    ordered_next.pop();
                    if ordered_next.is_empty() {
                        out.blank();
                    }
                }
                TagEnd::Item => out.flush(),
                _ => {}
            },
            Event::SoftBreak => out.push(Span::raw(" ")),
            Event::HardBreak => out.flush(),
            _ => {}
        }
    }

    out.finish()
}
