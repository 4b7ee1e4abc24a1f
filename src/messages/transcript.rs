//! Plain-text transcript export
//!
//! Writes the visible conversation to `Transcript.txt` in a user-chosen
//! directory, one block per message in display order.

use super::types::Message;
use crate::{ParleyError, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TRANSCRIPT_FILE_NAME: &str = "Transcript.txt";

/// Write a transcript of `messages` into `dir`.
///
/// The directory must already exist; the file is overwritten if present.
/// Returns the path of the written file.
pub fn write_transcript(dir: &Path, messages: &[Message]) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ParleyError::IoError(format!(
            "transcript directory does not exist: {}",
            dir.display()
        )));
    }

    let mut contents = String::new();
    for message in messages {
        let _ = write!(
            contents,
            "name: {} \ntime: {} \nmessage: {}\n\n",
            message.sender.display_name(),
            message.timestamp_display(),
            message.text
        );
    }

    let path = dir.join(TRANSCRIPT_FILE_NAME);
    std::fs::write(&path, contents)?;

    info!(path = %path.display(), count = messages.len(), "transcript written");

    Ok(path)
}
