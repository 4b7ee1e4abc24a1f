pub mod audio;
pub mod chat;
pub mod config;
pub mod messages;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParleyError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for ParleyError {
    fn from(e: std::io::Error) -> Self {
        ParleyError::IoError(e.to_string())
    }
}

impl ParleyError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware/device errors may require user intervention
            ParleyError::AudioDeviceError(_) => false,
            // Model errors require restarting
            ParleyError::ModelLoadError(_) => false,
            // These are typically transient errors
            ParleyError::TranscriptionError(_) => true,
            ParleyError::InferenceError(_) => true,
            ParleyError::IoError(_) => false,
            ParleyError::AudioProcessingError(_) => true,
            ParleyError::ConfigError(_) => false,
            ParleyError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ParleyError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone.".to_string()
            }
            ParleyError::ModelLoadError(_) => {
                "Failed to load a model. Please verify model files are present.".to_string()
            }
            ParleyError::TranscriptionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            ParleyError::InferenceError(_) => {
                "Response generation failed. Please try again.".to_string()
            }
            ParleyError::IoError(_) => "File system error occurred.".to_string(),
            ParleyError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            ParleyError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            ParleyError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;
