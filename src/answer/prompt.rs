//! Prompt construction and answer post-processing.

use crate::crawler::Document;

const INSTRUCTION: &str = "Answer the question based on the following documentation context. \
If the answer is not contained in the context, say you don't know.";

const ANSWER_MARKER: &str = "Answer:";

/// Build the grounded prompt from retrieved documents, nearest first
pub fn build_prompt(question: &str, documents: &[Document]) -> String {
    let context = documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\nContext:\n{}\n\nQuestion: {}\n{}",
        INSTRUCTION, context, question, ANSWER_MARKER
    )
}

/// Keep only the text after the last `Answer:` marker
///
/// Generation services often echo the prompt, so the marker that ends the
/// prompt is used to cut it off. Text without a marker is kept whole.
pub fn extract_answer(generated: &str) -> String {
    generated
        .rsplit(ANSWER_MARKER)
        .next()
        .unwrap_or(generated)
        .trim()
        .to_string()
}

/// Whether the model declined to answer
pub fn is_non_answer(answer: &str) -> bool {
    answer.is_empty() || answer.to_lowercase().contains("i don't know")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        let docs = vec![
            Document::new("https://example.com/a", "First page."),
            Document::new("https://example.com/b", "Second page."),
        ];

        let prompt = build_prompt("How do I log in?", &docs);
        assert_eq!(
            prompt,
            "Answer the question based on the following documentation context. \
If the answer is not contained in the context, say you don't know.\n\n\
Context:\nFirst page.\n\nSecond page.\n\n\
Question: How do I log in?\nAnswer:"
        );
    }

    #[test]
    fn test_extract_answer_after_last_marker() {
        let generated = "Context: ...\nQuestion: q\n\
            Answer: Use the Answer: field\nAnswer:  Click Login. ";
        assert_eq!(extract_answer(generated), "Click Login.");
        assert_eq!(extract_answer("  plain text "), "plain text");
        assert_eq!(extract_answer("Answer:"), "");
    }

    #[test]
    fn test_non_answer_detection() {
        assert!(is_non_answer(""));
        assert!(is_non_answer("I DON'T KNOW."));
        assert!(is_non_answer("Sorry, i don't know that"));
        assert!(!is_non_answer("Click the reset link"));
    }
}
