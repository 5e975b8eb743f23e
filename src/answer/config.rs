//! Configuration for the question answering engine.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::answer::error::AnswerError;

/// File consulted for variables missing from the process environment
pub const DOTENV_FILE: &str = ".env";

/// Default text-generation endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-Instruct-v0.1";

/// Environment variable holding the bearer token (required)
pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Environment variable overriding [`DEFAULT_ENDPOINT`]
pub const ENDPOINT_ENV: &str = "HF_MODEL_URL";

/// Default timeout for a generation request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of generated tokens
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 256;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default number of documents retrieved per question
pub const DEFAULT_TOP_K: usize = 3;

/// Settings for retrieval and generation
#[derive(Clone)]
pub struct AnswerConfig {
    /// Text-generation endpoint receiving the prompt
    pub endpoint: String,

    /// Bearer token sent with every generation request
    pub api_token: String,

    /// Time bound for one generation request
    pub request_timeout: Duration,

    /// Maximum number of tokens to generate
    pub max_new_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Number of documents retrieved as context
    pub top_k: usize,
}

// The token stays out of logs.
impl std::fmt::Debug for AnswerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl AnswerConfig {
    /// Create a configuration with default settings and the given token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: api_token.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Read `HF_API_TOKEN` and `HF_MODEL_URL` from the process environment,
    /// falling back to a `.env` file in the working directory
    pub fn from_env() -> Result<Self, AnswerError> {
        Self::from_env_and_file(Path::new(DOTENV_FILE))
    }

    /// Like [`AnswerConfig::from_env`] with an explicit env file
    ///
    /// Variables set in the process environment win over the file.
    pub fn from_env_and_file(path: &Path) -> Result<Self, AnswerError> {
        let file = read_env_file(path);
        let lookup = |key: &str| std::env::var(key).ok().or_else(|| file.get(key).cloned());
        Self::from_lookup(lookup)
    }

    /// Build a configuration from an arbitrary variable lookup
    ///
    /// A missing or blank token is a configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnswerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(API_TOKEN_ENV)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                AnswerError::Configuration(format!(
                    "{} environment variable is required but not set",
                    API_TOKEN_ENV
                ))
            })?;

        let mut config = Self::new(api_token.trim());
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|url| !url.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        Ok(config)
    }

    /// Set the generation endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the generation request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the number of retrieved documents
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check that the configuration can be used before any request is made
    pub fn validate(&self) -> Result<(), AnswerError> {
        if self.api_token.trim().is_empty() {
            return Err(AnswerError::Configuration(format!(
                "{} environment variable is required but not set",
                API_TOKEN_ENV
            )));
        }
        url::Url::parse(&self.endpoint).map_err(|e| {
            AnswerError::Configuration(format!("Invalid endpoint {}: {}", self.endpoint, e))
        })?;
        Ok(())
    }
}

/// Parse `KEY=value` lines from `path` without touching the process environment
///
/// A missing file yields no variables. Lines that fail to parse are skipped.
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return HashMap::new(),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let vars: HashMap<String, String> = entries
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("Skipping line in {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    debug!("Read {} variables from {}", vars.len(), path.display());
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnswerConfig::from_lookup(lookup(&[(API_TOKEN_ENV, "hf_abc")])).unwrap();

        assert_eq!(config.api_token, "hf_abc");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_new_tokens, 256);
        assert_eq!(config.top_k, 3);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_token() {
        let err = AnswerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AnswerError::Configuration(_)));
        assert!(err.to_string().contains("HF_API_TOKEN"));

        let blank = AnswerConfig::from_lookup(lookup(&[(API_TOKEN_ENV, "  ")]));
        assert!(matches!(blank, Err(AnswerError::Configuration(_))));
    }

    #[test]
    fn test_endpoint_override() {
        let config = AnswerConfig::from_lookup(lookup(&[
            (API_TOKEN_ENV, "hf_abc"),
            (ENDPOINT_ENV, "http://localhost:8080/generate"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/generate");
    }

    #[test]
    fn test_validate() {
        assert!(AnswerConfig::new("token").validate().is_ok());
        assert!(AnswerConfig::new("").validate().is_err());
        assert!(
            AnswerConfig::new("token")
                .with_endpoint("not a url")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_env_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        let contents = "# local settings\nHF_API_TOKEN=hf_from_file\n\
            HF_MODEL_URL=\"http://localhost:8080/generate\"\n";
        std::fs::write(&path, contents).unwrap();

        let vars = read_env_file(&path);
        assert_eq!(vars.len(), 2);

        let config = AnswerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.api_token, "hf_from_file");
        assert_eq!(config.endpoint, "http://localhost:8080/generate");
    }

    #[test]
    fn test_missing_env_file() {
        let tmp = TempDir::new().unwrap();
        assert!(read_env_file(&tmp.path().join(".env")).is_empty());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", AnswerConfig::new("hf_secret"));
        assert!(!rendered.contains("hf_secret"));
    }
}
