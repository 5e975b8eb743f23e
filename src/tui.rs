//! # Terminal User Interface Module
//!
//! Chat front end for the help desk. The user crawls a site with
//! `/crawl <url>` and then asks questions; answers appear in the transcript
//! with their sources listed underneath.
//!
//! ## Key Components
//!
//! - `app`: input handling, commands and transcript state
//! - `event`: terminal ticks, key presses and results from the worker
//! - `logging`: file logging so log lines never draw over the UI
//! - `markdown`: markdown rendering for transcript entries
//! - `ui`: layout of transcript, status line and input box
//!
//! The [`Session`] lives on a worker task that handles one request at a
//! time, so the UI keeps animating while a crawl or question is in flight.

pub mod app;
pub mod event;
pub mod logging;
pub mod markdown;
pub mod ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use helpdesk::session::Session;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use tokio::sync::mpsc;
use tracing::info;

use crate::tui::app::{App, HELP_TEXT, Speaker};
use crate::tui::event::{AppEvent, Event};
use crate::tui::ui::draw;

/// Work handed to the session task
enum Request {
    Crawl(String),
    Ask(String),
}

/// Run the TUI application, optionally crawling `initial_url` right away
pub async fn run(session: Session, initial_url: Option<String>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    app.add_message(Speaker::System, HELP_TEXT);

    let (request_tx, request_rx) = mpsc::unbounded_channel::<Request>();
    tokio::spawn(serve_requests(session, request_rx, app.event_sender()));

    if let Some(url) = initial_url {
        let _ = app.event_sender().send(Event::App(AppEvent::Crawl(url)));
    }

    terminal.clear()?;

    let result = async {
        while !app.should_quit {
            terminal.draw(|f| draw(f, &app))?;

            match app.next_event().await {
                Some(Event::App(AppEvent::Crawl(url))) => {
                    let _ = request_tx.send(Request::Crawl(url));
                }
                Some(Event::App(AppEvent::Ask(question))) => {
                    let _ = request_tx.send(Request::Ask(question));
                }
                Some(_) => {}
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn serve_requests(
    mut session: Session,
    mut requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<Event>,
) {
    while let Some(request) = requests.recv().await {
        let event = match request {
            Request::Crawl(url) => match session.initialize(&url).await {
                Ok(summary) => {
                    info!("Indexed {} ({} documents)", url, summary.documents);
                    AppEvent::Indexed { url, summary }
                }
                Err(e) => AppEvent::Failed(e.to_string()),
            },
            Request::Ask(question) => match session.ask(&question).await {
                Ok(answer) => AppEvent::Answered(answer),
                Err(e) => AppEvent::Failed(e.to_string()),
            },
        };

        if events.send(Event::App(event)).is_err() {
            break;
        }
    }
}
