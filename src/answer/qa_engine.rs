//! Retrieval-augmented question answering.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::answer::config::AnswerConfig;
use crate::answer::error::AnswerError;
use crate::answer::generation::{GenerationClient, GenerationResult};
use crate::answer::prompt::{build_prompt, extract_answer, is_non_answer};
use crate::index::VectorIndex;

/// Reply when retrieval finds nothing
pub const NO_DOCUMENTS_MESSAGE: &str =
    "Sorry, I couldn't find any information in the documentation.";

/// Reply when the model cannot answer from the context
pub const NO_ANSWER_MESSAGE: &str =
    "Sorry, I couldn't find any information about that in the documentation.";

/// Reply when the response lacks `generated_text`
pub const MALFORMED_SHAPE_MESSAGE: &str =
    "Sorry, received an unexpected response format from the AI service.";

/// Reply when the response is not a non-empty array
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "Sorry, received an empty or invalid response from the AI service.";

/// Reply when the generation request times out
pub const TIMEOUT_MESSAGE: &str = "Error: Request timed out. Please try again.";

/// An answer and the URLs of the pages it was grounded on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Text shown to the user
    pub text: String,

    /// Source URLs, nearest first; empty for failures
    pub sources: Vec<String>,
}

impl Answer {
    fn without_sources(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Answers questions from an initialized index
#[derive(Debug)]
pub struct QaEngine {
    index: VectorIndex,
    client: GenerationClient,
    top_k: usize,
}

impl QaEngine {
    /// Create an engine, rejecting unusable configuration before any request
    pub fn new(index: VectorIndex, config: &AnswerConfig) -> Result<Self, AnswerError> {
        let client = GenerationClient::new(config)?;
        Ok(Self {
            index,
            client,
            top_k: config.top_k,
        })
    }

    /// The index questions are answered from
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Answer `question`
    ///
    /// Never fails: every error becomes answer text with no sources, and the
    /// engine stays usable for the next question.
    #[instrument(skip(self), fields(top_k = self.top_k))]
    pub async fn answer(&self, question: &str) -> Answer {
        match self.try_answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Question answering failed: {}", e);
                Answer::without_sources(failure_message(&e))
            }
        }
    }

    async fn try_answer(&self, question: &str) -> Result<Answer, AnswerError> {
        let documents = self.index.query(question, self.top_k)?;
        if documents.is_empty() {
            info!("No relevant documents found");
            return Ok(Answer::without_sources(NO_DOCUMENTS_MESSAGE));
        }
        info!("Retrieved {} documents", documents.len());

        let prompt = build_prompt(question, &documents);
        let answer = match self.client.generate(&prompt).await? {
            GenerationResult::Success(generated) => {
                let text = extract_answer(&generated);
                if is_non_answer(&text) {
                    NO_ANSWER_MESSAGE.to_string()
                } else {
                    text
                }
            }
            GenerationResult::MalformedShape(detail) => {
                warn!("Unexpected generation response shape: {}", detail);
                return Ok(Answer::without_sources(MALFORMED_SHAPE_MESSAGE));
            }
            GenerationResult::Empty => {
                warn!("Empty generation response");
                return Ok(Answer::without_sources(EMPTY_RESPONSE_MESSAGE));
            }
        };

        Ok(Answer {
            text: answer,
            sources: documents.into_iter().map(|doc| doc.url).collect(),
        })
    }
}

fn failure_message(err: &AnswerError) -> String {
    match err {
        AnswerError::Timeout => TIMEOUT_MESSAGE.to_string(),
        AnswerError::Network(e) => format!("Error: Network request failed: {}", e),
        AnswerError::MalformedResponse(detail) => {
            format!("Error: Unexpected response format: {}", detail)
        }
        AnswerError::Index(e) => format!("Error during question answering: {}", e),
        AnswerError::Configuration(detail) => {
            format!("Error during question answering: {}", detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Document;
    use crate::index::{FlatIndex, HashEmbedder, IndexStore, MINILM_DIMENSIONS};
    use mockito::{Matcher, Mock, Server};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn built_index(tmp: &TempDir) -> VectorIndex {
        let mut index = VectorIndex::new(
            Arc::new(HashEmbedder::default()),
            IndexStore::new(tmp.path()),
        );
        index
            .build(vec![
                Document::new(
                    "https://help.example.com/reset",
                    "To reset your password open settings and click reset password",
                ),
                Document::new(
                    "https://help.example.com/billing",
                    "Invoices are emailed on the first day of every month",
                ),
            ])
            .await
            .unwrap();
        index
    }

    fn config_for(endpoint: String) -> AnswerConfig {
        AnswerConfig::new("test-token").with_endpoint(endpoint)
    }

    async fn engine_with_response(
        tmp: &TempDir,
        server: &mut Server,
        status: usize,
        body: &str,
    ) -> (QaEngine, Mock) {
        let mock = server
            .mock("POST", "/generate")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let engine = QaEngine::new(
            built_index(tmp).await,
            &config_for(format!("{}/generate", server.url())),
        )
        .unwrap();
        (engine, mock)
    }

    #[tokio::test]
    async fn test_answer_with_sources() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let body = r#"[{"generated_text": "...Question: x\nAnswer: Click reset password."}]"#;
        let mock = server
            .mock("POST", "/generate")
            .match_body(Matcher::Regex("reset your password".to_string()))
            .with_status(200)
            .with_body(body)
            .expect(1)
            .create_async()
            .await;

        let engine = QaEngine::new(
            built_index(&tmp).await,
            &config_for(format!("{}/generate", server.url())),
        )
        .unwrap();
        let answer = engine.answer("How do I reset my password?").await;

        assert_eq!(answer.text, "Click reset password.");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0], "https://help.example.com/reset");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_i_dont_know_keeps_sources() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let (engine, _mock) = engine_with_response(
            &tmp,
            &mut server,
            200,
            r#"[{"generated_text": "Answer: I don't know."}]"#,
        )
        .await;

        let answer = engine.answer("What is the refund policy?").await;
        assert_eq!(answer.text, NO_ANSWER_MESSAGE);
        assert_eq!(answer.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_answer_keeps_sources() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let body = r#"[{"generated_text": "Answer:   "}]"#;
        let (engine, _mock) = engine_with_response(&tmp, &mut server, 200, body).await;

        let answer = engine.answer("invoices").await;
        assert_eq!(answer.text, NO_ANSWER_MESSAGE);
        assert!(!answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_response_shape_failures() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let (engine, _mock) =
            engine_with_response(&tmp, &mut server, 200, r#"[{"summary": "text"}]"#).await;
        let answer = engine.answer("invoices").await;
        assert_eq!(answer.text, MALFORMED_SHAPE_MESSAGE);
        assert!(answer.sources.is_empty());

        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let (engine, _mock) = engine_with_response(&tmp, &mut server, 200, "[]").await;
        let answer = engine.answer("invoices").await;
        assert_eq!(answer.text, EMPTY_RESPONSE_MESSAGE);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_network_and_format_errors() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let (engine, _mock) = engine_with_response(&tmp, &mut server, 500, "boom").await;
        let answer = engine.answer("invoices").await;
        assert!(answer.text.starts_with("Error: Network request failed: "));
        assert!(answer.sources.is_empty());

        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let (engine, _mock) = engine_with_response(&tmp, &mut server, 200, "not json").await;
        let answer = engine.answer("invoices").await;
        let text = answer.text;
        assert!(text.starts_with("Error: Unexpected response format: "));
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_blank_question_finds_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .expect(0)
            .create_async()
            .await;
        let engine = QaEngine::new(
            built_index(&tmp).await,
            &config_for(format!("{}/generate", server.url())),
        )
        .unwrap();

        let answer = engine.answer("   ").await;
        assert_eq!(answer.text, NO_DOCUMENTS_MESSAGE);
        assert!(answer.sources.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_index_without_documents() {
        let tmp = TempDir::new().unwrap();
        let store = IndexStore::new(tmp.path());
        store
            .write(&FlatIndex::new(MINILM_DIMENSIONS), &[])
            .await
            .unwrap();

        let mut index = VectorIndex::new(Arc::new(HashEmbedder::default()), store);
        assert!(index.load().await.unwrap());
        assert!(index.is_empty());

        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .expect(0)
            .create_async()
            .await;
        let engine = QaEngine::new(index, &config_for(format!("{}/generate", server.url())))
            .unwrap();

        let answer = engine.answer("What is the refund policy?").await;
        assert_eq!(answer.text, NO_DOCUMENTS_MESSAGE);
        assert!(answer.sources.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_uninitialized_index() {
        let tmp = TempDir::new().unwrap();
        let index = VectorIndex::new(
            Arc::new(HashEmbedder::default()),
            IndexStore::new(tmp.path()),
        );
        let config = config_for("http://127.0.0.1:9/generate".to_string());
        let engine = QaEngine::new(index, &config).unwrap();

        let answer = engine.answer("anything").await;
        assert_eq!(
            answer.text,
            "Error during question answering: Vector index not initialized"
        );
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_then_recovers() {
        // Accepts connections but never responds
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let tmp = TempDir::new().unwrap();
        let config = config_for(format!("http://{}/generate", addr))
            .with_request_timeout(Duration::from_millis(200));
        let engine = QaEngine::new(built_index(&tmp).await, &config).unwrap();

        let answer = engine.answer("reset password").await;
        assert_eq!(answer.text, TIMEOUT_MESSAGE);
        assert!(answer.sources.is_empty());

        // The same engine keeps working
        let answer = engine.answer("reset password").await;
        assert_eq!(answer.text, TIMEOUT_MESSAGE);
        assert_eq!(engine.index().len(), 2);
    }

    #[test]
    fn test_missing_token_rejected() {
        let tmp = TempDir::new().unwrap();
        let index = VectorIndex::new(
            Arc::new(HashEmbedder::default()),
            IndexStore::new(tmp.path()),
        );
        let result = QaEngine::new(index, &AnswerConfig::new(""));
        assert!(matches!(result, Err(AnswerError::Configuration(_))));
    }
}
