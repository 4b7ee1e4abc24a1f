//! Application settings
//!
//! The small configuration record edited through the settings panel.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings surfaced in the settings panel.
///
/// `clear_chat` and `create_transcript` are one-shot actions performed when
/// the panel is accepted; the remaining fields persist for the session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Index into the enumerated input devices
    pub microphone_index: usize,

    /// Clear the conversation when the settings are accepted
    pub clear_chat: bool,

    /// Write a transcript when the settings are accepted
    pub create_transcript: bool,

    /// Directory the transcript is written to
    pub transcript_dir: String,

    /// Ask for a verdict on every new bot reply
    pub learning_mode: bool,
}

impl ChatSettings {
    /// Validate the settings record.
    ///
    /// The transcript directory must exist on disk before the settings are
    /// accepted; the empty default therefore fails validation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !Path::new(&self.transcript_dir).is_dir() {
            return Err(format!(
                "Transcript directory does not exist: \"{}\"",
                self.transcript_dir
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_rejected() {
        // The empty path never names an existing directory
        let settings = ChatSettings::default();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_directory_rejected() {
        let settings = ChatSettings {
            transcript_dir: "/definitely/not/a/real/directory".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_existing_directory_accepted() {
        let settings = ChatSettings {
            transcript_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }
}
