//! # Help Desk - Retrieval-Augmented QA for Help Websites
//!
//! This crate crawls a documentation website, builds a semantic index of its
//! pages and answers questions by retrieving the most relevant pages and
//! prompting a hosted language model with their text.
//!
//! ## Features
//!
//! - Bounded breadth-first crawling restricted to the site's host and port
//! - Boilerplate-free text extraction from HTML
//! - Local sentence embeddings with an exact nearest-neighbour index
//! - Per-site index persistence, reused across sessions
//! - Grounded answers with source URLs and user-facing failure messages
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use helpdesk::answer::AnswerConfig;
//! use helpdesk::index::embedder_from_env;
//! use helpdesk::session::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads HF_API_TOKEN (and optionally HF_MODEL_URL)
//!     let config = SessionConfig::new(AnswerConfig::from_env()?);
//!     let mut session = Session::new(config, embedder_from_env()?);
//!
//!     let summary = session.initialize("https://help.example.com").await?;
//!     println!("Indexed {} pages", summary.documents);
//!
//!     let answer = session.ask("How do I reset my password?").await?;
//!     println!("{}", answer.text);
//!     for source in answer.sources {
//!         println!("- {}", source);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod markdown;

pub mod answer;
pub mod crawler;
pub mod index;
pub mod session;

pub use error::Error;
pub use markdown::{print_answer, write_answer, write_markdown};

/// Commonly used types
pub mod prelude {
    pub use crate::answer::{Answer, AnswerConfig, QaEngine};
    pub use crate::crawler::{CrawlerConfig, Document};
    pub use crate::error::{Error, Result};
    pub use crate::index::{Embedder, IndexOutcome, IndexStore, StoreConfig, VectorIndex};
    pub use crate::session::{Session, SessionConfig};
}
