//! Prompt text for the response engine

use crate::chat::corrections::CorrectionStore;

/// Base system prompt for the assistant
pub const SYSTEM_PROMPT: &str = "\
You are a friendly desktop chat assistant. Reply to each statement with a \
single short answer in plain text. Do not use markdown formatting. If you \
cannot make sense of a statement, say so briefly.";

/// Reply used when the engine produces an empty response
pub const FALLBACK_RESPONSE: &str = "I am sorry, but I do not understand.";

/// Base system prompt extended with any learned corrections.
pub fn system_prompt_with_corrections(corrections: &CorrectionStore) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();
    prompt.push_str(&corrections.render_examples());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_corrections() {
        let store = CorrectionStore::new();
        assert_eq!(system_prompt_with_corrections(&store), SYSTEM_PROMPT);
    }

    #[test]
    fn test_prompt_includes_corrections() {
        let mut store = CorrectionStore::new();
        store.record(Some("ping".to_string()), "pong");

        let prompt = system_prompt_with_corrections(&store);
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("pong"));
    }
}
