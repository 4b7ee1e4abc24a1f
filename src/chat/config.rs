//! Response engine configuration

use std::path::PathBuf;

/// Quantization type for model weights
#[derive(Clone, Debug, Default)]
pub enum QuantizationType {
    /// No quantization (full precision)
    None,
    /// 4-bit quantization (Q4K)
    #[default]
    Q4K,
    /// 8-bit quantization (Q8_0)
    Q8_0,
    /// 4-bit quantization (Q4_0)
    Q4_0,
}

/// Configuration for the response engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Model identifier (HuggingFace model ID or local path)
    pub model_id: String,

    /// Quantization type for model weights
    pub quantization: QuantizationType,

    /// Context window size (max tokens in conversation)
    pub context_size: usize,

    /// Where learning-mode corrections are persisted
    pub corrections_path: PathBuf,

    /// Enable logging of inference details
    pub enable_logging: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_id: "microsoft/Phi-3.5-mini-instruct".to_string(),
            quantization: QuantizationType::Q4K,
            context_size: 4096,
            corrections_path: PathBuf::from("corrections.json"),
            enable_logging: false,
        }
    }
}

impl EngineConfig {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    pub fn with_quantization(mut self, quantization: QuantizationType) -> Self {
        self.quantization = quantization;
        self
    }

    pub fn with_context_size(mut self, context_size: usize) -> Self {
        self.context_size = context_size;
        self
    }

    pub fn with_corrections_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corrections_path = path.into();
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(!config.model_id.is_empty());
        assert!(config.context_size > 0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new("meta-llama/Llama-3.2-1B")
            .with_context_size(2048)
            .with_corrections_path("/tmp/c.json");

        assert_eq!(config.model_id, "meta-llama/Llama-3.2-1B");
        assert_eq!(config.context_size, 2048);
        assert_eq!(config.corrections_path, PathBuf::from("/tmp/c.json"));
    }
}
