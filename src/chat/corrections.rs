//! Learning-mode correction store
//!
//! When the user marks a bot reply as wrong and supplies a better one, the
//! corrected reply is recorded here together with the prompt it answers. The
//! store is persisted as JSON and replayed into the system prompt at engine
//! startup, so learned responses survive restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single learned correction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Correction {
    /// The user statement the bad reply answered, when one exists
    pub prompt: Option<String>,

    /// The reply the user supplied as correct
    pub reply: String,

    pub learned_at: DateTime<Utc>,
}

/// Corrections recorded in learning mode, persisted as JSON.
#[derive(Clone, Debug, Default)]
pub struct CorrectionStore {
    path: Option<PathBuf>,
    corrections: Vec<Correction>,
}

impl CorrectionStore {
    /// In-memory store with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`, starting empty if the file is absent or
    /// unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let corrections = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<Correction>>(&contents) {
                Ok(corrections) => {
                    info!(
                        count = corrections.len(),
                        path = %path.display(),
                        "loaded corrections"
                    );
                    corrections
                }
                Err(e) => {
                    warn!(path = %path.display(), "failed to parse corrections: {e}");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), "failed to read corrections: {e}");
                Vec::new()
            }
        };

        Self {
            path: Some(path),
            corrections,
        }
    }

    /// Record a corrected reply for the given prompt.
    pub fn record(&mut self, prompt: Option<String>, reply: impl Into<String>) {
        let reply = reply.into();
        debug!(?prompt, %reply, "recording correction");

        self.corrections.push(Correction {
            prompt,
            reply,
            learned_at: Utc::now(),
        });
    }

    /// Persist the store to its backing file, if it has one.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.corrections)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, json)
    }

    /// Render the corrections as example lines for the system prompt.
    ///
    /// Returns an empty string when nothing has been learned.
    pub fn render_examples(&self) -> String {
        if self.corrections.is_empty() {
            return String::new();
        }

        let mut out = String::from(
            "\n\nThe user has taught you these corrected replies. \
             Prefer them when the same or a very similar statement comes up:\n",
        );

        for correction in &self.corrections {
            match &correction.prompt {
                Some(prompt) => {
                    let _ = writeln!(out, "- When asked \"{prompt}\", reply: {}", correction.reply);
                }
                None => {
                    let _ = writeln!(out, "- A known good reply: {}", correction.reply);
                }
            }
        }

        out
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("parley-corrections-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_record_and_render() {
        let mut store = CorrectionStore::new();
        assert!(store.is_empty());
        assert!(store.render_examples().is_empty());

        store.record(Some("what is rust".to_string()), "A systems language.");

        assert_eq!(store.len(), 1);
        let examples = store.render_examples();
        assert!(examples.contains("what is rust"));
        assert!(examples.contains("A systems language."));
    }

    #[test]
    fn test_record_without_prompt() {
        let mut store = CorrectionStore::new();
        store.record(None, "Good morning!");

        assert!(store.render_examples().contains("Good morning!"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path();

        let mut store = CorrectionStore::load(&path);
        assert!(store.is_empty());

        store.record(Some("hi".to_string()), "Hello!");
        store.save().unwrap();

        let reloaded = CorrectionStore::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.render_examples().contains("Hello!"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let store = CorrectionStore::load(temp_path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_without_path_is_noop() {
        let mut store = CorrectionStore::new();
        store.record(None, "reply");
        assert!(store.save().is_ok());
    }
}
