use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::answer::Answer;
use crate::error::Result;

/// Width of the rule printed after each answer
pub const RULE_WIDTH: usize = 60;

/// Print an answer, its sources and a closing rule to stdout
pub fn print_answer(answer: &Answer) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    write_answer(&mut stdout, answer)
}

/// Render `markdown` into any color-capable writer
pub fn write_markdown<W: WriteColor>(out: &mut W, markdown: &str) -> Result<()> {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut state = FormatState::new();

    for event in parser {
        state.handle_event(out, event)?;
    }
    out.reset()?;
    Ok(())
}

/// Render an answer the way the interactive prompt shows it
pub fn write_answer<W: WriteColor>(out: &mut W, answer: &Answer) -> Result<()> {
    writeln!(out)?;
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "Answer:")?;
    out.reset()?;
    write_markdown(out, &answer.text)?;
    writeln!(out)?;

    if !answer.sources.is_empty() {
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "Sources:")?;
        out.reset()?;
        for source in &answer.sources {
            write!(out, "- ")?;
            out.set_color(fg(Color::Blue).set_underline(true))?;
            write!(out, "{}", source)?;
            out.reset()?;
            writeln!(out)?;
        }
    }

    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    Ok(())
}

fn fg(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

/// Tracks the current formatting state
struct FormatState {
    list_level: usize,
    format_stack: Vec<ColorSpec>,
    ordered_next: Vec<Option<u64>>,
}

impl FormatState {
    fn new() -> Self {
        Self {
            list_level: 0,
            format_stack: Vec::new(),
            ordered_next: Vec::new(),
        }
    }

    fn handle_event<W: WriteColor>(&mut self, out: &mut W, event: Event) -> Result<()> {
        match event {
            Event::Start(tag) => self.handle_start(out, tag),
            Event::End(tag_end) => self.handle_end(out, tag_end),
            Event::Text(text) => Ok(write!(out, "{}", text)?),
            Event::Code(code) => self.write_inline_code(out, &code),
            Event::SoftBreak | Event::HardBreak => Ok(writeln!(out)?),
            _ => Ok(()),
        }
    }

    fn push_spec<W: WriteColor>(&mut self, out: &mut W, spec: ColorSpec) -> Result<()> {
        out.set_color(&spec)?;
        self.format_stack.push(spec);
        Ok(())
    }

    fn pop_spec<W: WriteColor>(&mut self, out: &mut W) -> Result<()> {
        self.format_stack.pop();
        match self.format_stack.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }

    fn handle_start<W: WriteColor>(&mut self, out: &mut W, tag: Tag) -> Result<()> {
        match tag {
            Tag::Heading { level, .. } => {
                let level_color = match level {
                    HeadingLevel::H1 => Color::Rgb(255, 99, 71),
                    HeadingLevel::H2 => Color::Rgb(70, 130, 180),
                    _ => Color::Cyan,
                };
                writeln!(out)?;
                self.push_spec(out, fg(level_color).set_bold(true).clone())?;
            }
            Tag::Paragraph => {
                if self.list_level == 0 {
                    writeln!(out)?
                }
            }
            Tag::Strong => self.push_spec(out, ColorSpec::new().set_bold(true).clone())?,
            Tag::Emphasis => self.push_spec(out, ColorSpec::new().set_italic(true).clone())?,
            Tag::BlockQuote(_) => {
                self.push_spec(out, fg(Color::Yellow))?;
                write!(out, "  │ ")?
            }
            Tag::CodeBlock(kind) => {
                writeln!(out)?;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        out.set_color(fg(Color::Blue).set_italic(true))?;
                        writeln!(out, "[{}]", lang)?;
                    }
                }
                self.push_spec(out, fg(Color::Green))?;
            }
            Tag::List(start) => {
                if self.list_level == 0 {
                    writeln!(out)?;
                }
                self.list_level += 1;
                self.ordered_next.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_level.saturating_sub(1));
                match self.ordered_next.last_mut() {
                    Some(Some(n)) => {
                        write!(out, "{}{}. ", indent, n)?;
                        *n += 1;
                    }
                    _ => write!(out, "{}• ", indent)?,
                }
            }
            Tag::Link { .. } => {
                self.push_spec(out, fg(Color::Blue).set_underline(true).clone())?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end<W: WriteColor>(&mut self, out: &mut W, tag_end: TagEnd) -> Result<()> {
        match tag_end {
            TagEnd::Heading(_) => {
                self.pop_spec(out)?;
                writeln!(out)?
            }
            TagEnd::Paragraph => {
                if self.list_level == 0 {
                    writeln!(out)?
                }
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Link => self.pop_spec(out)?,
            TagEnd::BlockQuote(_) | TagEnd::CodeBlock => {
                self.pop_spec(out)?;
                writeln!(out)?
            }
            TagEnd::List(_) => {
                self.list_level = self.list_level.saturating_sub(1);
                self.ordered_next.pop();
            }
            TagEnd::Item => writeln!(out)?,
            _ => {}
        }
        Ok(())
    }

    fn write_inline_code<W: WriteColor>(&self, out: &mut W, code: &str) -> Result<()> {
        out.set_color(&fg(Color::Green))?;
        write!(out, "`{}`", code)?;

        match self.format_stack.last() {
            Some(spec) => out.set_color(spec)?,
            None => out.reset()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn render(markdown: &str) -> String {
        let mut buffer = Buffer::no_color();
        write_markdown(&mut buffer, markdown).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_lists() {
        let markdown = "Steps:\n\n1. Open settings\n2. Click reset\n\n- one\n- two\n";
        let out = render(markdown);
        assert!(out.contains("1. Open settings\n"));
        assert!(out.contains("2. Click reset\n"));
        assert!(out.contains("• one\n"));
    }

    #[test]
    fn test_inline_code_and_text() {
        let out = render("Run `helpdesk --url x` to **start**.");
        assert!(out.contains("Run `helpdesk --url x` to start."));
    }

    #[test]
    fn test_answer_with_sources() {
        let answer = Answer {
            text: "Click reset.".to_string(),
            sources: vec![
                "https://help.example.com/a".to_string(),
                "https://help.example.com/b".to_string(),
            ],
        };
        let mut buffer = Buffer::no_color();
        write_answer(&mut buffer, &answer).unwrap();
        let out = String::from_utf8(buffer.into_inner()).unwrap();

        assert!(out.starts_with("\nAnswer:\nClick reset.\n"));
        let sources = "Sources:\n- https://help.example.com/a\n- https://help.example.com/b\n";
        assert!(out.contains(sources));
        assert!(out.ends_with(&format!("{}\n", "-".repeat(60))));
    }

    #[test]
    fn test_answer_without_sources() {
        let answer = Answer {
            text: "Error: Request timed out. Please try again.".to_string(),
            sources: Vec::new(),
        };
        let mut buffer = Buffer::no_color();
        write_answer(&mut buffer, &answer).unwrap();
        let out = String::from_utf8(buffer.into_inner()).unwrap();

        assert!(!out.contains("Sources:"));
        assert!(out.contains("Request timed out"));
    }
}
