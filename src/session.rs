//! Conversation state for one user of the help desk.
//!
//! A [`Session`] owns the transcript and, once a site has been crawled and
//! indexed, the [`QaEngine`] answering questions about it. Front ends hold a
//! session and pass it around explicitly.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::answer::{Answer, AnswerConfig, QaEngine};
use crate::crawler::{CrawlerConfig, Document, crawl};
use crate::error::{Error, Result};
use crate::index::{Embedder, IndexOutcome, IndexStore, StoreConfig, load_or_build};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    /// The person asking
    User,
    /// The help desk
    Bot,
}

/// One entry of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    /// Author of the turn
    pub role: Role,

    /// Question or answer text
    pub text: String,

    /// Source URLs backing a bot answer
    pub sources: Vec<String>,
}

/// Settings for every stage of a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Crawl limits and extraction rules
    pub crawler: CrawlerConfig,

    /// Where indexes are persisted
    pub store: StoreConfig,

    /// Generation settings
    pub answer: AnswerConfig,

    /// Discard any persisted index and build a fresh one
    pub rebuild: bool,
}

impl SessionConfig {
    /// Default crawl and storage settings around `answer`
    pub fn new(answer: AnswerConfig) -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            store: StoreConfig::default(),
            answer,
            rebuild: false,
        }
    }
}

/// How the index behind a session was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of indexed documents
    pub documents: usize,

    /// Whether the index was reused from disk
    pub loaded: bool,
}

/// A conversation with the help desk about one site
pub struct Session {
    config: SessionConfig,
    embedder: Arc<dyn Embedder>,
    conversation: Vec<Turn>,
    engine: Option<QaEngine>,
    base_url: Option<String>,
}

impl Session {
    /// Create a session that has not indexed any site yet
    pub fn new(config: SessionConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            conversation: Vec::new(),
            engine: None,
            base_url: None,
        }
    }

    /// Crawl `base_url` into documents
    ///
    /// The answer configuration is checked first, so a missing token is
    /// reported before any network traffic. An unparsable URL is
    /// `InvalidUrl`; a crawl that yields nothing is `EmptyInput`.
    #[instrument(skip(self))]
    pub async fn crawl(&self, base_url: &str) -> Result<Vec<Document>> {
        self.config.answer.validate()?;

        let report = crawl(base_url, &self.config.crawler).await?;
        if report.documents.is_empty() {
            return Err(Error::EmptyInput(format!(
                "no page under {} had enough text ({} visited)",
                base_url,
                report.visited.len()
            )));
        }
        Ok(report.documents)
    }

    /// Load or build the index for `base_url` and get ready to answer
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn index(
        &mut self,
        base_url: &str,
        documents: Vec<Document>,
    ) -> Result<IndexSummary> {
        let store = IndexStore::for_site(&self.config.store, base_url)?;
        if self.config.rebuild {
            info!("Discarding persisted index in {}", store.dir().display());
            store.clear().await?;
        }

        let outcome = load_or_build(self.embedder.clone(), store, documents).await;
        let loaded = outcome.is_loaded();
        let index = match outcome {
            IndexOutcome::Loaded(index) | IndexOutcome::Built(index) => index,
            IndexOutcome::Failed(e) => return Err(e.into()),
        };

        let summary = IndexSummary {
            documents: index.len(),
            loaded,
        };
        self.engine = Some(QaEngine::new(index, &self.config.answer)?);
        self.base_url = Some(base_url.to_string());
        Ok(summary)
    }

    /// Crawl and index `base_url`
    pub async fn initialize(&mut self, base_url: &str) -> Result<IndexSummary> {
        let documents = self.crawl(base_url).await?;
        self.index(base_url, documents).await
    }

    /// Answer `question` and record both turns
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let engine = self.engine.as_ref().ok_or(Error::NotInitialized)?;
        let answer = engine.answer(question).await;

        self.conversation.push(Turn {
            role: Role::User,
            text: question.to_string(),
            sources: Vec::new(),
        });
        self.conversation.push(Turn {
            role: Role::Bot,
            text: answer.text.clone(),
            sources: answer.sources.clone(),
        });
        Ok(answer)
    }

    /// The transcript so far, oldest first
    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    /// Whether questions can be answered
    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// Site the session currently answers about
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}
