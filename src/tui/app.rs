use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use helpdesk::answer::Answer;
use ratatui::text::Text;
use tokio::sync::mpsc;

use crate::tui::event::{AppEvent, Event, EventHandler};
use crate::tui::markdown::markdown_to_ratatui_text;

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
    System,
}

/// What the user typed, once Enter is pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/crawl <url>`
    Crawl(String),
    /// `/quit`, `/exit`, `exit` or `quit`
    Quit,
    /// `/help`
    Help,
    /// Anything else
    Ask(String),
    /// A slash command that could not be understood
    Invalid(String),
}

/// Interpret a submitted input line
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        return Command::Quit;
    }

    let Some(rest) = input.strip_prefix('/') else {
        return Command::Ask(input.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "crawl" if !arg.is_empty() => Command::Crawl(arg.to_string()),
        "crawl" => Command::Invalid("Usage: /crawl <url>".to_string()),
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        other => Command::Invalid(format!("Unknown command /{}", other)),
    }
}

/// Format an answer and its sources as markdown for the transcript
pub fn answer_markdown(answer: &Answer) -> String {
    let mut text = answer.text.clone();
    if !answer.sources.is_empty() {
        text.push_str("\n\n**Sources:**\n");
        for source in &answer.sources {
            text.push_str(&format!("\n- <{}>", source));
        }
    }
    text
}

pub const HELP_TEXT: &str = "# Help Desk\n\n\
* `/crawl <url>` crawls a help site and indexes it.\n\
* Type a question and press Enter to ask it.\n\
* Use the mouse wheel or arrow keys to scroll the transcript.\n\
* Press Esc, Ctrl+C or type `/quit` to exit.";

/// Application state
pub struct App {
    /// Current input text
    pub input: String,
    /// Cursor position in the input field, in characters
    pub cursor_position: usize,
    /// Flag to indicate if the application should quit
    pub should_quit: bool,
    /// Rendered transcript entries
    pub rendered_messages: Vec<(Speaker, Text<'static>)>,
    /// Label of the running operation, if any
    pub busy: Option<String>,
    /// Counter for spinner animation frames
    pub spinner_frame: usize,
    /// Site questions are answered about
    pub site: Option<String>,
    /// Current scroll position
    pub scroll_position: usize,
    event_handler: EventHandler,
}

impl App {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor_position: 0,
            should_quit: false,
            rendered_messages: Vec::new(),
            busy: None,
            spinner_frame: 0,
            site: None,
            scroll_position: 0,
            event_handler: EventHandler::new(),
        }
    }

    /// Get the next event
    pub async fn next_event(&mut self) -> Option<Event> {
        let event = self.event_handler.next().await?;
        match &event {
            Event::Terminal(term_event) => self.handle_terminal_event(term_event),
            Event::Tick => self.tick_spinner(),
            Event::App(app_event) => self.handle_app_event(app_event),
        }
        Some(event)
    }

    /// Get the event sender
    pub fn event_sender(&self) -> mpsc::UnboundedSender<Event> {
        self.event_handler.sender()
    }

    fn send(&self, event: AppEvent) {
        if self.event_handler.sender().send(Event::App(event)).is_err() {
            tracing::warn!("Event channel closed");
        }
    }

    fn handle_terminal_event(&mut self, event: &crossterm::event::Event) {
        match event {
            crossterm::event::Event::Key(key) => self.handle_key_event(*key),
            crossterm::event::Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_by(-5),
                MouseEventKind::ScrollDown => self.scroll_by(5),
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_app_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Ask(question) => {
                self.add_message(Speaker::User, question);
                self.busy = Some("Thinking...".to_string());
            }
            AppEvent::Crawl(url) => {
                let notice = format!("Crawling documentation from {} ...", url);
                self.add_message(Speaker::System, &notice);
                self.busy = Some("Crawling and indexing...".to_string());
            }
            AppEvent::Indexed { url, summary } => {
                self.busy = None;
                self.site = Some(url.clone());
                let source = if summary.loaded {
                    "Loaded existing vector store from disk."
                } else {
                    "Created new vector store."
                };
                self.add_message(
                    Speaker::System,
                    &format!(
                        "{} Indexed {} pages. Ask your questions.",
                        source, summary.documents
                    ),
                );
            }
            AppEvent::Answered(answer) => {
                self.busy = None;
                self.add_message(Speaker::Bot, &answer_markdown(answer));
            }
            AppEvent::Failed(error) => {
                self.busy = None;
                self.add_message(Speaker::System, &format!("**Error:** {}", error));
            }
            AppEvent::Quit => self.should_quit = true,
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.send(AppEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.send(AppEvent::Quit)
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }
        if self.busy.is_some() {
            self.add_message(Speaker::System, "Still working on the previous request.");
            return;
        }
        self.reset_input();

        match parse_command(&input) {
            Command::Crawl(url) => self.send(AppEvent::Crawl(url)),
            Command::Quit => self.send(AppEvent::Quit),
            Command::Help => self.add_message(Speaker::System, HELP_TEXT),
            Command::Invalid(message) => self.add_message(Speaker::System, &message),
            Command::Ask(_) if self.site.is_none() => self.add_message(
                Speaker::System,
                "No site indexed yet. Use `/crawl <url>` first.",
            ),
            Command::Ask(question) => self.send(AppEvent::Ask(question)),
        }
    }

    /// Add a message to the transcript and scroll to it
    pub fn add_message(&mut self, speaker: Speaker, text: &str) {
        self.rendered_messages
            .push((speaker, markdown_to_ratatui_text(text)));
        self.scroll_position = self.total_height().saturating_sub(1);
    }

    /// Total height of all messages
    pub fn total_height(&self) -> usize {
        self.rendered_messages
            .iter()
            .map(|(_, text)| text.height() + 2)
            .sum()
    }

    /// Reset the input field
    pub fn reset_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.input.len(), |(i, _)| i)
    }

    /// Move cursor left in the input field
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right in the input field
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_position += 1;
    }

    /// Delete character at cursor position
    pub fn delete_char(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    /// Delete character before cursor position (backspace)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    /// Scroll by a number of lines (positive = down, negative = up)
    pub fn scroll_by(&mut self, delta: i32) {
        let max_pos = self.total_height().saturating_sub(1);
        self.scroll_position = if delta < 0 {
            self.scroll_position
                .saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.scroll_position
                .saturating_add(delta as usize)
                .min(max_pos)
        };
    }

    /// Input text left of the cursor
    pub fn input_before_cursor(&self) -> &str {
        &self.input[..self.byte_index()]
    }

    /// Update spinner frame
    pub fn tick_spinner(&mut self) {
        if self.busy.is_some() {
            self.spinner_frame = (self.spinner_frame + 1) % 8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("/crawl https://help.example.com"),
            Command::Crawl("https://help.example.com".to_string())
        );
        assert!(matches!(parse_command("/crawl"), Command::Invalid(_)));
        assert_eq!(parse_command("  exit "), Command::Quit);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
        assert!(matches!(parse_command("/bogus"), Command::Invalid(_)));
        assert_eq!(
            parse_command("How do I reset my password?"),
            Command::Ask("How do I reset my password?".to_string())
        );
    }

    #[test]
    fn test_answer_markdown_lists_sources() {
        let answer = Answer {
            text: "Click reset.".to_string(),
            sources: vec!["https://help.example.com/reset".to_string()],
        };
        assert_eq!(
            answer_markdown(&answer),
            "Click reset.\n\n**Sources:**\n\n- <https://help.example.com/reset>"
        );

        let failure = Answer {
            text: "Error: Request timed out. Please try again.".to_string(),
            sources: Vec::new(),
        };
        assert_eq!(answer_markdown(&failure), failure.text);
    }
}
