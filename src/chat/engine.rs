//! Response engine wrapping mistral.rs
//!
//! One statement in, one reply out. Response generation is fully delegated;
//! this adapter only builds the request and unpacks the reply.

use crate::chat::config::{EngineConfig, QuantizationType};
use crate::chat::context::{ConversationMessage, MessageRole};
use crate::chat::prompts::FALLBACK_RESPONSE;
use crate::{ParleyError, Result};
use mistralrs::{
    IsqType, PagedAttentionMetaBuilder, TextMessageRole, TextMessages, TextModelBuilder,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Conversational-response engine
pub struct ChatEngine {
    config: EngineConfig,
    model: Arc<mistralrs::Model>,
}

impl ChatEngine {
    /// Load the model and build the engine.
    pub async fn new(config: EngineConfig) -> Result<Self> {
        info!("Initializing response engine with model: {}", config.model_id);

        let isq_type = match config.quantization {
            QuantizationType::None => None,
            QuantizationType::Q4K => Some(IsqType::Q4K),
            QuantizationType::Q8_0 => Some(IsqType::Q8_0),
            QuantizationType::Q4_0 => Some(IsqType::Q4_0),
        };

        let mut builder = TextModelBuilder::new(&config.model_id);

        if let Some(isq) = isq_type {
            builder = builder.with_isq(isq);
        }

        if config.enable_logging {
            builder = builder.with_logging();
        }

        builder = builder
            .with_paged_attn(|| {
                PagedAttentionMetaBuilder::default()
                    .with_block_size(32)
                    .build()
            })
            .map_err(|e| {
                ParleyError::InferenceError(format!("Failed to configure paged attention: {e}"))
            })?;

        let model = builder.build().await.map_err(|e| {
            ParleyError::ModelLoadError(format!("Failed to load response model: {e}"))
        })?;

        info!("Response engine initialized");

        Ok(Self {
            config,
            model: Arc::new(model),
        })
    }

    /// Produce a single text reply for the given conversation.
    ///
    /// An empty engine reply is replaced by the fallback response, matching
    /// an engine that "does not understand".
    pub async fn respond(&self, messages: &[ConversationMessage]) -> Result<String> {
        let text_messages = build_messages(messages);

        let response = self
            .model
            .send_chat_request(text_messages)
            .await
            .map_err(|e| ParleyError::InferenceError(format!("Chat request failed: {e}")))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!(
            "Generated reply: {} tokens @ {:.1} tok/s",
            response.usage.completion_tokens, response.usage.avg_compl_tok_per_sec
        );

        let reply = content.trim();
        if reply.is_empty() {
            Ok(FALLBACK_RESPONSE.to_string())
        } else {
            Ok(reply.to_string())
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

fn build_messages(messages: &[ConversationMessage]) -> TextMessages {
    let mut text_messages = TextMessages::new();

    for msg in messages {
        let role = match msg.role {
            MessageRole::System => TextMessageRole::System,
            MessageRole::User => TextMessageRole::User,
            MessageRole::Assistant => TextMessageRole::Assistant,
        };

        text_messages = text_messages.add_message(role, &msg.content);
    }

    text_messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::context::ConversationContext;
    use crate::chat::prompts::SYSTEM_PROMPT;

    #[test]
    fn test_message_role_conversion() {
        assert_eq!(MessageRole::System.as_str(), "system");
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_context_feeds_engine_request() {
        let mut ctx = ConversationContext::new(SYSTEM_PROMPT, 4096);
        ctx.add_user_message("Hello");

        let messages = ctx.get_messages();
        assert_eq!(messages.len(), 2);

        // Building the request must not lose any message
        let _ = build_messages(&messages);
    }

    // Model-loading tests require weights on disk and are ignored by default
    #[tokio::test]
    #[ignore]
    async fn test_engine_creation() {
        let config = EngineConfig::default();
        let engine = ChatEngine::new(config).await;
        assert!(engine.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn test_simple_response() {
        let config = EngineConfig::default();
        let engine = ChatEngine::new(config).await.unwrap();

        let messages = vec![
            ConversationMessage::system(SYSTEM_PROMPT),
            ConversationMessage::user("Say hello in one word."),
        ];

        let reply = engine.respond(&messages).await.unwrap();
        assert!(!reply.is_empty());
    }
}
