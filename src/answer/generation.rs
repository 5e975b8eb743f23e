//! Client for the hosted text-generation endpoint.
//!
//! The service answers with a JSON array whose first element carries a
//! `generated_text` field. Anything else is classified once, here, into a
//! [`GenerationResult`] so callers never inspect raw JSON.

use reqwest::Client as ReqwestClient;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::answer::config::AnswerConfig;
use crate::answer::error::AnswerError;

/// Outcome of a generation request that returned a decodable body
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// The service produced text
    Success(String),
    /// A non-empty array whose first element lacks usable `generated_text`
    MalformedShape(String),
    /// Anything other than a non-empty array
    Empty,
}

impl GenerationResult {
    /// Classify a decoded response body
    pub fn from_value(value: &Value) -> Self {
        let Some(first) = value.as_array().and_then(|items| items.first()) else {
            return GenerationResult::Empty;
        };

        match first.get("generated_text") {
            Some(Value::String(text)) => GenerationResult::Success(text.clone()),
            Some(other) => {
                let detail = format!("generated_text is not a string: {}", other);
                GenerationResult::MalformedShape(detail)
            }
            None => GenerationResult::MalformedShape("missing generated_text".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
}

/// HTTP client for the text-generation service
#[derive(Clone)]
pub struct GenerationClient {
    client: ReqwestClient,
    endpoint: String,
    api_token: String,
    max_new_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Create a client from a validated configuration
    pub fn new(config: &AnswerConfig) -> Result<Self, AnswerError> {
        config.validate()?;

        let client = ReqwestClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                AnswerError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        })
    }

    /// Endpoint receiving the prompts
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `prompt` and classify the response
    #[instrument(skip_all, fields(endpoint = %self.endpoint, prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult, AnswerError> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
            },
        };

        debug!("Sending generation request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            error!("Generation service returned {}", status);
            AnswerError::from(e)
        })?;

        let text = response.text().await?;
        debug!("Received {} bytes from generation service", text.len());
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse generation response: {}", e);
            AnswerError::MalformedResponse(e.to_string())
        })?;

        Ok(GenerationResult::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> GenerationClient {
        let endpoint = format!("{}/generate", server.url());
        GenerationClient::new(&AnswerConfig::new("test-token").with_endpoint(endpoint)).unwrap()
    }

    #[test]
    fn test_classify_response_shapes() {
        assert_eq!(
            GenerationResult::from_value(&json!([{"generated_text": "hi"}])),
            GenerationResult::Success("hi".to_string())
        );
        assert!(matches!(
            GenerationResult::from_value(&json!([{"text": "hi"}])),
            GenerationResult::MalformedShape(_)
        ));
        assert!(matches!(
            GenerationResult::from_value(&json!([{"generated_text": 3}])),
            GenerationResult::MalformedShape(_)
        ));
        assert_eq!(
            GenerationResult::from_value(&json!([])),
            GenerationResult::Empty
        );
        assert_eq!(
            GenerationResult::from_value(&json!({"error": "loading"})),
            GenerationResult::Empty
        );
    }

    #[tokio::test]
    async fn test_generate_sends_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(json!({
                "inputs": "Question: why?\nAnswer:",
                "parameters": {"max_new_tokens": 256}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"generated_text": "Question: why?\nAnswer: because"}]"#)
            .expect(1)
            .create_async()
            .await;

        let result = client_for(&server)
            .generate("Question: why?\nAnswer:")
            .await
            .unwrap();

        assert_eq!(
            result,
            GenerationResult::Success("Question: why?\nAnswer: because".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate")
            .with_status(503)
            .with_body("Model is loading")
            .create_async()
            .await;

        let result = client_for(&server).generate("prompt").await;
        assert!(matches!(result, Err(AnswerError::Network(_))));
    }

    #[tokio::test]
    async fn test_generate_undecodable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/generate")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let result = client_for(&server).generate("prompt").await;
        assert!(matches!(result, Err(AnswerError::MalformedResponse(_))));
    }
}
