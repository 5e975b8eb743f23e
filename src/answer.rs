//! # Question Answering Module
//!
//! Retrieves the pages nearest to a question, prompts a hosted
//! text-generation model with their text and turns the reply into an
//! [`Answer`] with source URLs.
//!
//! ## Key Components
//!
//! - `AnswerConfig`: endpoint, token, timeout and sampling settings
//! - `GenerationClient`: one bearer-authenticated POST per question
//! - `GenerationResult`: the response shape, classified at the boundary
//! - `QaEngine`: retrieval, prompting and post-processing
//!
//! Failures never escape [`QaEngine::answer`]; they are reported to the user
//! as answer text without sources.

mod config;
pub mod error;
mod generation;
mod prompt;
mod qa_engine;

pub use config::{
    API_TOKEN_ENV, AnswerConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_NEW_TOKENS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DOTENV_FILE, ENDPOINT_ENV,
    read_env_file,
};
pub use error::AnswerError;
pub use generation::{GenerationClient, GenerationResult};
pub use prompt::{build_prompt, extract_answer};
pub use qa_engine::{
    Answer, EMPTY_RESPONSE_MESSAGE, MALFORMED_SHAPE_MESSAGE, NO_ANSWER_MESSAGE,
    NO_DOCUMENTS_MESSAGE, QaEngine, TIMEOUT_MESSAGE,
};
