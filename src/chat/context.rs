//! Conversation context management
//!
//! Keeps the running history forwarded to the response engine, trimmed to a
//! token budget so long sessions do not overflow the model context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in the engine conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub token_estimate: usize,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_estimate = estimate_tokens(&content);

        Self {
            role,
            content,
            timestamp: Utc::now(),
            token_estimate,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Manages the conversation history sent to the engine
#[derive(Clone, Debug)]
pub struct ConversationContext {
    system_prompt: String,
    system_tokens: usize,
    messages: Vec<ConversationMessage>,
    max_tokens: usize,
    current_tokens: usize,
    max_messages: usize,
}

impl ConversationContext {
    pub fn new(system_prompt: impl Into<String>, max_tokens: usize) -> Self {
        let system_prompt = system_prompt.into();
        let system_tokens = estimate_tokens(&system_prompt);

        Self {
            system_prompt,
            system_tokens,
            messages: Vec::new(),
            max_tokens,
            current_tokens: 0,
            max_messages: 100,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
        self.system_tokens = estimate_tokens(&self.system_prompt);
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.add_message(ConversationMessage::user(content));
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.add_message(ConversationMessage::assistant(content));
    }

    fn add_message(&mut self, message: ConversationMessage) {
        self.current_tokens += message.token_estimate;
        self.messages.push(message);
        self.trim_to_fit();
    }

    /// All messages including the system prompt, ready for the engine
    pub fn get_messages(&self) -> Vec<ConversationMessage> {
        let mut result = vec![ConversationMessage::system(self.system_prompt.clone())];
        result.extend(self.messages.clone());
        result
    }

    pub fn last_user_message(&self) -> Option<&ConversationMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.current_tokens = 0;
    }

    pub fn total_tokens(&self) -> usize {
        self.system_tokens + self.current_tokens
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn trim_to_fit(&mut self) {
        while self.total_tokens() > self.max_tokens && !self.messages.is_empty() {
            if let Some(removed) = self.messages.first() {
                self.current_tokens = self.current_tokens.saturating_sub(removed.token_estimate);
            }
            self.messages.remove(0);
        }

        while self.messages.len() > self.max_messages {
            if let Some(removed) = self.messages.first() {
                self.current_tokens = self.current_tokens.saturating_sub(removed.token_estimate);
            }
            self.messages.remove(0);
        }
    }
}

/// Estimate token count for a string.
///
/// ~4 characters per token for English text; actual tokenization varies by
/// model.
fn estimate_tokens(text: &str) -> usize {
    let char_estimate = (text.len() + 3) / 4;
    let word_estimate = text.split_whitespace().count();

    char_estimate.max(word_estimate).max(1)
}
