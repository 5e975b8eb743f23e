//! # Help Desk CLI Application
//!
//! Crawls a help website, indexes it and answers questions about it from the
//! terminal.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Line-oriented question loop on stdin/stdout (default)
//! - Full-screen chat interface (`--tui`)
//!
//! ## Features
//!
//! - Persisted per-site index reused across runs (`--rebuild` to discard it)
//! - Progress spinners for the crawl and indexing stages
//! - Markdown rendering of answers with their source URLs
//! - Graceful exit on `exit`, `quit`, end of input or Ctrl-C

mod telemetry;
mod tui;

use clap::Parser;
use helpdesk::Error;
use helpdesk::answer::AnswerConfig;
use helpdesk::crawler::CrawlerConfig;
use helpdesk::index::{StoreConfig, embedder_from_env};
use helpdesk::print_answer;
use helpdesk::session::{Session, SessionConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::instrument;

#[derive(Parser, Debug)]
#[command(author, version, about = "AI-powered help website QA agent", long_about = None)]
struct Cli {
    /// Help website base URL to crawl
    #[arg(short, long, required_unless_present = "tui")]
    url: Option<String>,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long, default_value = "200")]
    max_pages: usize,

    /// Directory holding the persisted indexes
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Discard any persisted index for the site and build a new one
    #[arg(long)]
    rebuild: bool,

    /// Maximum crawl requests per second (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    rate: u32,

    /// Open the chat interface instead of the line prompt
    #[arg(long)]
    tui: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file instead
    let _otel = if cli.tui {
        tui::logging::setup_logging()?;
        None
    } else {
        Some(telemetry::init_tracing_subscriber()?)
    };

    let answer = AnswerConfig::from_env()?;
    let config = SessionConfig {
        crawler: CrawlerConfig::builder()
            .max_pages(cli.max_pages)
            .requests_per_second(cli.rate)
            .build(),
        store: StoreConfig {
            data_dir: cli.data_dir.clone(),
        },
        answer,
        rebuild: cli.rebuild,
    };

    let embedder = tokio::task::spawn_blocking(embedder_from_env).await??;
    let session = Session::new(config, embedder);

    if cli.tui {
        return tui::run(session, cli.url).await;
    }

    match cli.url {
        Some(url) => run_cli(session, &url).await,
        None => Err(anyhow::anyhow!("--url is required without --tui")),
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

#[instrument(skip(session))]
async fn run_cli(mut session: Session, url: &str) -> anyhow::Result<()> {
    println!("Crawling documentation from {} ...", url);
    let crawling = spinner(format!("Crawling {}", url));
    let documents = session.crawl(url).await;
    crawling.finish_and_clear();

    let documents = match documents {
        Ok(documents) => documents,
        Err(Error::EmptyInput(_)) => {
            println!("No documentation content found. Exiting.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Processing and indexing {} pages ...", documents.len());
    let indexing = spinner("Embedding pages".to_string());
    let summary = session.index(url, documents).await;
    indexing.finish_and_clear();
    let summary = summary?;

    if summary.loaded {
        println!("Loaded existing vector store from disk.");
    } else {
        println!("Creating new vector store...");
    }

    println!("Agent ready. Ask your questions (type 'exit' to quit):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let thinking = spinner("Thinking...".to_string());
        let answer = tokio::select! {
            answer = session.ask(query) => Some(answer),
            _ = tokio::signal::ctrl_c() => None,
        };
        thinking.finish_and_clear();
        let Some(answer) = answer else {
            println!();
            break;
        };
        print_answer(&answer?)?;
    }

    println!("Goodbye!");
    Ok(())
}
